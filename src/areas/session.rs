use crate::areas::builder::TreeBuilder;
use crate::areas::controller::{CompareController, Role};
use crate::artifacts::compare::CompareFlags;
use crate::artifacts::errors::{ErrorPolicy, ReportingErrorHandler};
use crate::artifacts::nodes::ComparisonDirNode;
use std::cell::{RefCell, RefMut};
use std::sync::Arc;

/// Everything a command needs: the controller, the error handler shared by tree
/// building and comparison, and where the report goes
pub struct Session {
    writer: RefCell<Box<dyn std::io::Write>>,
    controller: CompareController,
    handler: ReportingErrorHandler,
}

impl Session {
    pub fn new(flags: CompareFlags, policy: ErrorPolicy, writer: Box<dyn std::io::Write>) -> Self {
        Session {
            writer: RefCell::new(writer),
            controller: CompareController::new(flags),
            handler: ReportingErrorHandler::new(policy),
        }
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn controller(&self) -> &CompareController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CompareController {
        &mut self.controller
    }

    /// Build both trees
    pub fn load(&mut self, old: &dyn TreeBuilder, new: &dyn TreeBuilder) -> anyhow::Result<()> {
        self.controller.set_root(Role::Old, old, &mut self.handler)?;
        self.controller.set_root(Role::New, new, &mut self.handler)
    }

    /// Compare the loaded trees, handing read failures to the session's handler
    pub fn run_comparison(&mut self) -> anyhow::Result<Option<Arc<ComparisonDirNode>>> {
        self.controller.compare(&mut self.handler)
    }
}
