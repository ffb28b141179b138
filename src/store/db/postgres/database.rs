use std::sync::Arc;

use tokio::runtime::Runtime;

use crate::{
    Result,
    store::{DbCollection, DbStore, Store, data::*},
};

use super::{DbInit, collection::Collection, synclient::SynClient};

pub struct PostgresStore {
    workflows: Arc<Collection<Workflow>>,
    nodes: Arc<Collection<Node>>,
    edges: Arc<Collection<Edge>>,
    executions: Arc<Collection<Execution>>,
    steps: Arc<Collection<Step>>,
    files: Arc<Collection<File>>,
    extensions: Arc<Collection<Extension>>,
    holidays: Arc<Collection<Holiday>>,
    routes: Arc<Collection<Route>>,
}

impl DbStore for PostgresStore {
    fn init(
        &self,
        s: &Store,
    ) -> Result<()> {
        self.workflows.init()?;
        self.nodes.init()?;
        self.edges.init()?;
        self.executions.init()?;
        self.steps.init()?;
        self.files.init()?;
        self.extensions.init()?;
        self.holidays.init()?;
        self.routes.init()?;

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

impl PostgresStore {
    pub fn new(
        db_url: &str,
        runtime: Arc<Runtime>,
    ) -> Result<Self> {
        let conn = Arc::new(SynClient::connect(db_url, runtime)?);

        Ok(Self {
            workflows: Arc::new(Collection::new(&conn)),
            nodes: Arc::new(Collection::new(&conn)),
            edges: Arc::new(Collection::new(&conn)),
            executions: Arc::new(Collection::new(&conn)),
            steps: Arc::new(Collection::new(&conn)),
            files: Arc::new(Collection::new(&conn)),
            extensions: Arc::new(Collection::new(&conn)),
            holidays: Arc::new(Collection::new(&conn)),
            routes: Arc::new(Collection::new(&conn)),
        })
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
