use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

/// Liveness token for one mounted view.
///
/// Clones share the flag. Once [`close`](ViewScope::close) is called, work
/// started on behalf of the view must not write its results anywhere.
#[derive(Clone, Debug)]
pub struct ViewScope {
    alive: Rc<Cell<bool>>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        Self {
            alive: Rc::new(Cell::new(true)),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    pub fn close(&self) {
        self.alive.set(false);
    }

    /// Await `work`, discarding its output if the view closed meanwhile.
    pub async fn run<F: Future>(&self, work: F) -> Option<F::Output> {
        let output = work.await;
        self.is_alive().then_some(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_drops_output_after_close() {
        let scope = ViewScope::new();
        assert_eq!(scope.run(async { 1 }).await, Some(1));

        let closer = scope.clone();
        let result = scope
            .run(async move {
                closer.close();
                2
            })
            .await;
        assert_eq!(result, None);
        assert!(!scope.is_alive());
    }
}
