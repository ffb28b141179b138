mod collect;
mod document;

use std::sync::Arc;

use crate::{
    Result,
    store::{DbCollection, DbStore, Store, data::*},
};
pub use collect::Collect;
pub(crate) use document::DbDocument;

#[derive(Debug, Clone)]
pub struct MemStore {
    workflows: Arc<Collect<Workflow>>,
    nodes: Arc<Collect<Node>>,
    edges: Arc<Collect<Edge>>,
    executions: Arc<Collect<Execution>>,
    steps: Arc<Collect<Step>>,
    files: Arc<Collect<File>>,
    extensions: Arc<Collect<Extension>>,
    holidays: Arc<Collect<Holiday>>,
    routes: Arc<Collect<Route>>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DbStore for MemStore {
    fn init(
        &self,
        s: &Store,
    ) -> Result<()> {
        s.register(self.workflows());
        s.register(self.nodes());
        s.register(self.edges());
        s.register(self.executions());
        s.register(self.steps());
        s.register(self.files());
        s.register(self.extensions());
        s.register(self.holidays());
        s.register(self.routes());
        Ok(())
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            workflows: Arc::new(Collect::new("workflow")),
            nodes: Arc::new(Collect::new("node")),
            edges: Arc::new(Collect::new("edge")),
            executions: Arc::new(Collect::new("execution")),
            steps: Arc::new(Collect::new("step")),
            files: Arc::new(Collect::new("file")),
            extensions: Arc::new(Collect::new("extension request")),
            holidays: Arc::new(Collect::new("holiday")),
            routes: Arc::new(Collect::new("route")),
        }
    }

    pub fn workflows(&self) -> Arc<dyn DbCollection<Item = Workflow> + Send + Sync> {
        self.workflows.clone()
    }

    pub fn nodes(&self) -> Arc<dyn DbCollection<Item = Node> + Send + Sync> {
        self.nodes.clone()
    }

    pub fn edges(&self) -> Arc<dyn DbCollection<Item = Edge> + Send + Sync> {
        self.edges.clone()
    }

    pub fn executions(&self) -> Arc<dyn DbCollection<Item = Execution> + Send + Sync> {
        self.executions.clone()
    }

    pub fn steps(&self) -> Arc<dyn DbCollection<Item = Step> + Send + Sync> {
        self.steps.clone()
    }

    pub fn files(&self) -> Arc<dyn DbCollection<Item = File> + Send + Sync> {
        self.files.clone()
    }

    pub fn extensions(&self) -> Arc<dyn DbCollection<Item = Extension> + Send + Sync> {
        self.extensions.clone()
    }

    pub fn holidays(&self) -> Arc<dyn DbCollection<Item = Holiday> + Send + Sync> {
        self.holidays.clone()
    }

    pub fn routes(&self) -> Arc<dyn DbCollection<Item = Route> + Send + Sync> {
        self.routes.clone()
    }
}
