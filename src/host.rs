//! Host bundle - the document and scheduler a list is mounted into.

use std::fmt;
use std::rc::Rc;

use crate::dom::Dom;
use crate::scheduler::Scheduler;

/// Document adapter plus scheduler, shared by every list on a page.
///
/// Cheap to clone.
///
/// ```ignore
/// let dom = Rc::new(MockDom::new());
/// let scheduler = Rc::new(ManualScheduler::new());
/// let host = Host::new(dom.clone(), scheduler.clone());
/// ```
#[derive(Clone)]
pub struct Host {
    dom: Rc<dyn Dom>,
    scheduler: Rc<dyn Scheduler>,
}

impl Host {
    pub fn new(dom: Rc<dyn Dom>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self { dom, scheduler }
    }

    pub fn dom(&self) -> &Rc<dyn Dom> {
        &self.dom
    }

    pub fn scheduler(&self) -> &Rc<dyn Scheduler> {
        &self.scheduler
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}
