pub mod app;
pub mod error;
pub mod events;
pub mod layout;
pub mod render;
pub mod widgets;

pub use app::{App, Mode, Tab};
pub use error::TuiError;
pub use events::run_event_loop;
pub use layout::Layout;
pub use render::render;

use crate::auth::Session;
use crate::calendar::Zone;
use crate::{Config, Database};

/// Open the kanban board for the signed-in user and run until they quit
pub fn run(config: Config, database: Database, session: Session, zone: Zone) -> Result<(), TuiError> {
    let app = App::new(config, database, session, zone)?;
    run_event_loop(app)
}
