/// Records held by a view, plus the bookkeeping that keeps late or stale fetch results from
/// landing in a view that has moved on or been torn down.
#[derive(Debug, Clone)]
pub struct ViewState<T> {
    records: Vec<T>,
    generation: u64,
    mounted: bool,
}

/// Issued when a fetch starts; only the newest ticket may install rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self { records: Vec::new(), generation: 0, mounted: true }
    }
}

impl<T> ViewState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket(self.generation)
    }

    /// Install fetched rows. Returns false, leaving the records untouched, when the ticket
    /// is stale or the view is gone.
    pub fn apply(&mut self, ticket: FetchTicket, rows: Vec<T>) -> bool {
        if !self.mounted || ticket.0 != self.generation {
            tracing::debug!(ticket = ticket.0, current = self.generation, mounted = self.mounted, "dropping fetch result");
            return false;
        }
        self.records = rows;
        true
    }

    /// Patch one record in place. Same guard as `apply`, without a ticket since the patch
    /// comes from the mutation the view itself issued.
    pub fn patch<F>(&mut self, matches: F, row: T) -> bool
    where
        F: Fn(&T) -> bool,
    {
        if !self.mounted {
            return false;
        }
        match self.records.iter_mut().find(|r| matches(r)) {
            Some(slot) => {
                *slot = row;
                true
            }
            None => false,
        }
    }

    pub fn remove<F>(&mut self, matches: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        if !self.mounted {
            return false;
        }
        let before = self.records.len();
        self.records.retain(|r| !matches(r));
        self.records.len() != before
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_latest_ticket_installs_rows() {
        let mut view = ViewState::new();
        let stale = view.begin_fetch();
        let fresh = view.begin_fetch();
        assert!(view.apply(fresh, vec![1, 2]));
        assert!(!view.apply(stale, vec![9]));
        assert_eq!(view.records(), &[1, 2]);
    }

    #[test]
    fn unmounted_views_ignore_results() {
        let mut view = ViewState::new();
        let ticket = view.begin_fetch();
        view.unmount();
        assert!(!view.apply(ticket, vec![1]));
        assert!(!view.patch(|_| true, 5));
        assert!(view.records().is_empty());
    }

    #[test]
    fn patch_and_remove_target_matching_rows() {
        let mut view = ViewState::new();
        let ticket = view.begin_fetch();
        view.apply(ticket, vec![(1, "a"), (2, "b")]);
        assert!(view.patch(|r| r.0 == 2, (2, "B")));
        assert!(!view.patch(|r| r.0 == 3, (3, "c")));
        assert!(view.remove(|r| r.0 == 1));
        assert_eq!(view.records(), &[(2, "B")]);
    }
}
