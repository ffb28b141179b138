//! Workflow definition store: drafts, nodes, edges, import/export and publishing.

use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::{
    FilingError, Result,
    model::{EdgeModel, NodeModel, WorkflowModel},
    store::{
        Store,
        data::{Edge, Execution, ExecutionStatus, Node, Workflow},
        query::{Expr, Query},
    },
    utils::{longid, time::time_millis},
    workflow::{NodeType, ValidationReport, WorkflowGraph, validate},
};

/// Fields for a new draft workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewWorkflow {
    pub name: String,
    pub code: String,
    pub desc: String,
    pub department_id: Option<String>,
    pub file_type: Option<String>,
    pub priority_category: Option<String>,
}

/// Partial update of a workflow's descriptive fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowPatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub desc: Option<String>,
    pub department_id: Option<String>,
    pub file_type: Option<String>,
    pub priority_category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowFilter {
    pub department_id: Option<String>,
    pub file_type: Option<String>,
    pub is_active: Option<bool>,
    pub is_published: Option<bool>,
}

/// A workflow with its nodes and edges, in definition order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub workflow: Workflow,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl WorkflowDefinition {
    pub fn graph(&self) -> Result<WorkflowGraph> {
        WorkflowGraph::build(self.nodes.clone(), self.edges.clone())
    }
}

#[derive(Clone)]
pub struct Definitions {
    store: Arc<Store>,
}

impl Definitions {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
        }
    }

    pub fn create_workflow(
        &self,
        new: NewWorkflow,
        user: &str,
    ) -> Result<Workflow> {
        self.ensure_unique_code(&new.code, None)?;
        let workflow = self.draft(new, user);
        self.store.workflows()?.create(&workflow)?;
        info!(wid = %workflow.id, code = %workflow.code, "workflow created");
        Ok(workflow)
    }

    /// Imports a designer definition as a new draft.
    ///
    /// Node keys are checked for uniqueness and every edge must reference known
    /// keys before anything is written.
    pub fn deploy(
        &self,
        model: &WorkflowModel,
        user: &str,
    ) -> Result<WorkflowDefinition> {
        trace!("definitions::deploy({})", model.code);
        self.ensure_unique_code(&model.code, None)?;

        let workflow = self.draft(
            NewWorkflow {
                name: model.name.clone(),
                code: model.code.clone(),
                desc: model.desc.clone(),
                department_id: model.department_id.clone(),
                file_type: model.file_type.clone(),
                priority_category: model.priority_category.clone(),
            },
            user,
        );

        let now = time_millis();
        let mut keys = HashMap::new();
        let mut nodes = Vec::with_capacity(model.nodes.len());
        for (seq, m) in model.nodes.iter().enumerate() {
            let node = node_from_model(&workflow.id, m, seq as i64, now);
            if keys.insert(node.nid.clone(), node.id.clone()).is_some() {
                return Err(FilingError::DomainRule(format!("duplicate node key '{}' in workflow {}", m.id, model.code)));
            }
            nodes.push(node);
        }

        let mut edges = Vec::with_capacity(model.edges.len());
        for (seq, m) in model.edges.iter().enumerate() {
            let source = keys.get(&m.source).ok_or_else(|| FilingError::DomainRule(format!("edge source '{}' is not a node of workflow {}", m.source, model.code)))?;
            let target = keys.get(&m.target).ok_or_else(|| FilingError::DomainRule(format!("edge target '{}' is not a node of workflow {}", m.target, model.code)))?;
            edges.push(edge_from_model(&workflow.id, source, target, m, seq as i64, now));
        }

        self.store.workflows()?.create(&workflow)?;
        let node_set = self.store.nodes()?;
        for node in &nodes {
            node_set.create(node)?;
        }
        let edge_set = self.store.edges()?;
        for edge in &edges {
            edge_set.create(edge)?;
        }
        info!(wid = %workflow.id, code = %workflow.code, nodes = nodes.len(), edges = edges.len(), "workflow deployed");

        Ok(WorkflowDefinition {
            workflow,
            nodes,
            edges,
        })
    }

    /// Exports a workflow in the designer format; edges refer to node keys.
    pub fn export(
        &self,
        wid: &str,
    ) -> Result<WorkflowModel> {
        let def = self.get_workflow(wid)?;
        let keys: HashMap<&str, &str> = def.nodes.iter().map(|n| (n.id.as_str(), n.nid.as_str())).collect();

        let nodes = def
            .nodes
            .iter()
            .map(|n| NodeModel {
                id: n.nid.clone(),
                node_type: n.node_type,
                label: n.label.clone(),
                desc: n.desc.clone(),
                assignee_type: n.assignee_type,
                assignee_value: n.assignee_value.clone(),
                time_limit: n.time_limit,
                time_unit: n.time_unit,
                available_actions: n.available_actions.clone(),
                conditions: n.conditions.clone(),
                position_x: n.position_x,
                position_y: n.position_y,
                config: n.config.clone(),
            })
            .collect();

        let mut edges = Vec::with_capacity(def.edges.len());
        for e in &def.edges {
            let (Some(source), Some(target)) = (keys.get(e.source.as_str()), keys.get(e.target.as_str())) else {
                return Err(FilingError::Fatal(format!("edge {} of workflow {} references a missing node", e.id, wid)));
            };
            edges.push(EdgeModel {
                source: source.to_string(),
                target: target.to_string(),
                label: e.label.clone(),
                condition: e.condition.clone(),
                priority: e.priority,
                style: e.style.clone(),
            });
        }

        let w = def.workflow;
        Ok(WorkflowModel {
            name: w.name,
            code: w.code,
            desc: w.desc,
            department_id: w.department_id,
            file_type: w.file_type,
            priority_category: w.priority_category,
            nodes,
            edges,
        })
    }

    /// Copies a workflow under a new code; storage ids are regenerated, node keys kept.
    pub fn clone_workflow(
        &self,
        wid: &str,
        new_code: &str,
        new_name: &str,
        user: &str,
    ) -> Result<WorkflowDefinition> {
        let mut model = self.export(wid)?;
        model.code = new_code.to_string();
        model.name = new_name.to_string();
        self.deploy(&model, user)
    }

    pub fn update_workflow(
        &self,
        wid: &str,
        patch: WorkflowPatch,
    ) -> Result<Workflow> {
        let mut workflow = self.store.workflows()?.find(wid)?;
        self.ensure_not_running(wid)?;
        if let Some(code) = patch.code {
            if code != workflow.code {
                self.ensure_unique_code(&code, Some(wid))?;
                workflow.code = code;
            }
        }
        if let Some(name) = patch.name {
            workflow.name = name;
        }
        if let Some(desc) = patch.desc {
            workflow.desc = desc;
        }
        if patch.department_id.is_some() {
            workflow.department_id = patch.department_id;
        }
        if patch.file_type.is_some() {
            workflow.file_type = patch.file_type;
        }
        if patch.priority_category.is_some() {
            workflow.priority_category = patch.priority_category;
        }
        workflow.update_time = time_millis();
        self.store.workflows()?.update(&workflow)?;
        Ok(workflow)
    }

    /// Deletes a workflow with its nodes and edges.
    pub fn delete_workflow(
        &self,
        wid: &str,
    ) -> Result<()> {
        if !self.store.workflows()?.exists(wid)? {
            return Err(FilingError::NotFound(format!("workflow {} not found", wid)));
        }
        self.ensure_not_running(wid)?;

        let edges = self.store.edges()?;
        for edge in self.edges_of(wid)? {
            edges.delete(&edge.id)?;
        }
        let nodes = self.store.nodes()?;
        for node in self.nodes_of(wid)? {
            nodes.delete(&node.id)?;
        }
        self.store.workflows()?.delete(wid)?;
        info!(wid, "workflow deleted");
        Ok(())
    }

    pub fn get_workflow(
        &self,
        wid: &str,
    ) -> Result<WorkflowDefinition> {
        let workflow = self.store.workflows()?.find(wid)?;
        Ok(WorkflowDefinition {
            workflow,
            nodes: self.nodes_of(wid)?,
            edges: self.edges_of(wid)?,
        })
    }

    pub fn list_workflows(
        &self,
        filter: WorkflowFilter,
    ) -> Result<Vec<Workflow>> {
        let mut q = Query::new().order_by("create_time", true);
        if let Some(department_id) = filter.department_id {
            q = q.filter(Expr::eq("department_id", department_id));
        }
        if let Some(file_type) = filter.file_type {
            q = q.filter(Expr::eq("file_type", file_type));
        }
        if let Some(is_active) = filter.is_active {
            q = q.filter(Expr::eq("is_active", is_active));
        }
        if let Some(is_published) = filter.is_published {
            q = q.filter(Expr::eq("is_published", is_published));
        }
        self.store.select(&q)
    }

    pub fn add_node(
        &self,
        wid: &str,
        model: &NodeModel,
    ) -> Result<Node> {
        self.ensure_editable(wid)?;
        if self.node_by_key(wid, &model.id)?.is_some() {
            return Err(FilingError::DomainRule(format!("node key '{}' already exists in workflow {}", model.id, wid)));
        }
        let seq = self.nodes_of(wid)?.last().map_or(0, |n| n.seq + 1);
        let node = node_from_model(wid, model, seq, time_millis());
        self.store.nodes()?.create(&node)?;
        Ok(node)
    }

    /// Replaces a node's designer fields; the storage id and owner stay.
    pub fn update_node(
        &self,
        id: &str,
        model: &NodeModel,
    ) -> Result<Node> {
        let current = self.store.nodes()?.find(id)?;
        self.ensure_editable(&current.wid)?;
        if model.id != current.nid && self.node_by_key(&current.wid, &model.id)?.is_some() {
            return Err(FilingError::DomainRule(format!("node key '{}' already exists in workflow {}", model.id, current.wid)));
        }
        let mut node = node_from_model(&current.wid, model, current.seq, current.create_time);
        node.id = current.id;
        self.store.nodes()?.update(&node)?;
        Ok(node)
    }

    /// Removes a node and every edge touching it.
    pub fn remove_node(
        &self,
        id: &str,
    ) -> Result<()> {
        let node = self.store.nodes()?.find(id)?;
        self.ensure_editable(&node.wid)?;
        let edges = self.store.edges()?;
        for edge in self.edges_of(&node.wid)?.into_iter().filter(|e| e.source == node.id || e.target == node.id) {
            edges.delete(&edge.id)?;
        }
        self.store.nodes()?.delete(&node.id)?;
        Ok(())
    }

    pub fn add_edge(
        &self,
        wid: &str,
        model: &EdgeModel,
    ) -> Result<Edge> {
        self.ensure_editable(wid)?;
        let (source, target) = self.resolve_endpoints(wid, model)?;
        let seq = self.edges_of(wid)?.last().map_or(0, |e| e.seq + 1);
        let edge = edge_from_model(wid, &source, &target, model, seq, time_millis());
        self.store.edges()?.create(&edge)?;
        Ok(edge)
    }

    pub fn update_edge(
        &self,
        id: &str,
        model: &EdgeModel,
    ) -> Result<Edge> {
        let current = self.store.edges()?.find(id)?;
        self.ensure_editable(&current.wid)?;
        let (source, target) = self.resolve_endpoints(&current.wid, model)?;
        let mut edge = edge_from_model(&current.wid, &source, &target, model, current.seq, current.create_time);
        edge.id = current.id;
        self.store.edges()?.update(&edge)?;
        Ok(edge)
    }

    pub fn remove_edge(
        &self,
        id: &str,
    ) -> Result<()> {
        let edge = self.store.edges()?.find(id)?;
        self.ensure_editable(&edge.wid)?;
        self.store.edges()?.delete(&edge.id)?;
        Ok(())
    }

    pub fn validate(
        &self,
        wid: &str,
    ) -> Result<ValidationReport> {
        let graph = self.get_workflow(wid)?.graph()?;
        Ok(validate(&graph))
    }

    /// Publishes a draft: start and end nodes are re-checked regardless of
    /// whether `validate` was called.
    pub fn publish(
        &self,
        wid: &str,
        user: &str,
    ) -> Result<Workflow> {
        let def = self.get_workflow(wid)?;
        let graph = def.graph()?;
        if graph.nodes_of_type(NodeType::Start).is_empty() {
            return Err(FilingError::DomainRule(format!("workflow {} must have a start node", def.workflow.code)));
        }
        if graph.nodes_of_type(NodeType::End).is_empty() {
            return Err(FilingError::DomainRule(format!("workflow {} must have at least one end node", def.workflow.code)));
        }

        let now = time_millis();
        let mut workflow = def.workflow;
        workflow.is_draft = false;
        workflow.is_active = true;
        workflow.is_published = true;
        workflow.version += 1;
        workflow.published_by = Some(user.to_string());
        workflow.published_at = Some(now);
        workflow.update_time = now;
        self.store.workflows()?.update(&workflow)?;
        info!(wid, version = workflow.version, user, "workflow published");
        Ok(workflow)
    }

    /// Toggles whether new executions may start; only published workflows can be activated.
    pub fn set_active(
        &self,
        wid: &str,
        active: bool,
    ) -> Result<Workflow> {
        let mut workflow = self.store.workflows()?.find(wid)?;
        if active && !workflow.is_published {
            return Err(FilingError::InvalidState(format!("workflow {} is not published", workflow.code)));
        }
        workflow.is_active = active;
        workflow.update_time = time_millis();
        self.store.workflows()?.update(&workflow)?;
        info!(wid, active, "workflow activation changed");
        Ok(workflow)
    }

    /// Nodes in definition order.
    pub(crate) fn nodes_of(
        &self,
        wid: &str,
    ) -> Result<Vec<Node>> {
        self.store.select(&Query::new().filter(Expr::eq("wid", wid)).order_by("seq", false).order_by("id", false))
    }

    /// Edges in definition order.
    pub(crate) fn edges_of(
        &self,
        wid: &str,
    ) -> Result<Vec<Edge>> {
        self.store.select(&Query::new().filter(Expr::eq("wid", wid)).order_by("seq", false).order_by("id", false))
    }

    fn node_by_key(
        &self,
        wid: &str,
        nid: &str,
    ) -> Result<Option<Node>> {
        self.store.select_one(Query::new().filter(Expr::eq("wid", wid)).filter(Expr::eq("nid", nid)))
    }

    fn resolve_endpoints(
        &self,
        wid: &str,
        model: &EdgeModel,
    ) -> Result<(String, String)> {
        let source = self.node_by_key(wid, &model.source)?.ok_or_else(|| FilingError::DomainRule(format!("edge source '{}' is not a node of workflow {}", model.source, wid)))?;
        let target = self.node_by_key(wid, &model.target)?.ok_or_else(|| FilingError::DomainRule(format!("edge target '{}' is not a node of workflow {}", model.target, wid)))?;
        Ok((source.id, target.id))
    }

    fn ensure_unique_code(
        &self,
        code: &str,
        except: Option<&str>,
    ) -> Result<()> {
        let existing: Vec<Workflow> = self.store.select(&Query::new().filter(Expr::eq("code", code)))?;
        if existing.iter().any(|w| Some(w.id.as_str()) != except) {
            return Err(FilingError::DomainRule(format!("workflow code '{}' already exists", code)));
        }
        Ok(())
    }

    fn ensure_editable(
        &self,
        wid: &str,
    ) -> Result<()> {
        if !self.store.workflows()?.exists(wid)? {
            return Err(FilingError::NotFound(format!("workflow {} not found", wid)));
        }
        self.ensure_not_running(wid)
    }

    fn ensure_not_running(
        &self,
        wid: &str,
    ) -> Result<()> {
        let running: Option<Execution> = self.store.select_one(Query::new().filter(Expr::eq("wid", wid)).filter(Expr::eq("status", ExecutionStatus::Running.to_string())))?;
        if running.is_some() {
            return Err(FilingError::DomainRule(format!("workflow {} has running executions", wid)));
        }
        Ok(())
    }

    fn draft(
        &self,
        new: NewWorkflow,
        user: &str,
    ) -> Workflow {
        let now = time_millis();
        Workflow {
            id: longid(),
            name: new.name,
            code: new.code,
            desc: new.desc,
            department_id: new.department_id,
            file_type: new.file_type,
            priority_category: new.priority_category,
            is_draft: true,
            is_active: false,
            is_published: false,
            version: 1,
            created_by: user.to_string(),
            published_by: None,
            published_at: None,
            create_time: now,
            update_time: now,
        }
    }
}

fn node_from_model(
    wid: &str,
    m: &NodeModel,
    seq: i64,
    create_time: i64,
) -> Node {
    Node {
        id: longid(),
        wid: wid.to_string(),
        nid: m.id.clone(),
        node_type: m.node_type,
        label: m.label.clone(),
        desc: m.desc.clone(),
        assignee_type: m.assignee_type,
        assignee_value: m.assignee_value.clone(),
        time_limit: m.time_limit,
        time_unit: m.time_unit,
        available_actions: m.available_actions.clone(),
        conditions: m.conditions.clone(),
        position_x: m.position_x,
        position_y: m.position_y,
        config: m.config.clone(),
        seq,
        create_time,
    }
}

fn edge_from_model(
    wid: &str,
    source: &str,
    target: &str,
    m: &EdgeModel,
    seq: i64,
    create_time: i64,
) -> Edge {
    Edge {
        id: longid(),
        wid: wid.to_string(),
        source: source.to_string(),
        target: target.to_string(),
        label: m.label.clone(),
        condition: m.condition.clone(),
        priority: m.priority,
        style: m.style.clone(),
        seq,
        create_time,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::store::{DbStore, MemStore};

    fn node_keys(def: &WorkflowDefinition) -> HashSet<String> {
        def.nodes.iter().map(|n| n.nid.clone()).collect()
    }

    fn definitions() -> Definitions {
        let store = Arc::new(Store::new());
        MemStore::new().init(&store).unwrap();
        Definitions::new(store)
    }

    fn model(code: &str) -> WorkflowModel {
        WorkflowModel {
            name: "Leave".to_string(),
            code: code.to_string(),
            nodes: vec![
                NodeModel::new("start", NodeType::Start, "Start"),
                NodeModel::new("review", NodeType::Task, "Review").with_actions(&["approve", "return"]),
                NodeModel::new("end", NodeType::End, "End"),
            ],
            edges: vec![
                EdgeModel::new("start", "review"),
                EdgeModel::new("review", "end").with_label("approve"),
                EdgeModel::new("review", "start").with_label("return"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_create_workflow_is_draft() {
        let defs = definitions();
        let w = defs
            .create_workflow(
                NewWorkflow {
                    name: "Leave".into(),
                    code: "LEAVE".into(),
                    ..Default::default()
                },
                "u1",
            )
            .unwrap();
        assert!(w.is_draft && !w.is_active && !w.is_published);
        assert_eq!(w.version, 1);

        let dup = defs.create_workflow(
            NewWorkflow {
                name: "Other".into(),
                code: "LEAVE".into(),
                ..Default::default()
            },
            "u1",
        );
        assert!(matches!(dup, Err(FilingError::DomainRule(_))));
    }

    #[test]
    fn test_deploy_and_export() {
        let defs = definitions();
        let def = defs.deploy(&model("LEAVE"), "u1").unwrap();
        assert_eq!(def.nodes.len(), 3);
        assert_eq!(def.edges.len(), 3);
        assert!(defs.validate(&def.workflow.id).unwrap().valid);

        let exported = defs.export(&def.workflow.id).unwrap();
        assert_eq!(exported.code, "LEAVE");
        assert_eq!(exported.edges[1].source, "review");
        assert_eq!(exported.edges[1].target, "end");
    }

    #[test]
    fn test_deploy_rejects_bad_keys() {
        let defs = definitions();
        let mut m = model("DUP");
        m.nodes.push(NodeModel::new("end", NodeType::End, "End again"));
        assert!(matches!(defs.deploy(&m, "u1"), Err(FilingError::DomainRule(_))));

        let mut m = model("DANGLING");
        m.edges.push(EdgeModel::new("review", "ghost"));
        assert!(matches!(defs.deploy(&m, "u1"), Err(FilingError::DomainRule(_))));
        assert!(defs.list_workflows(WorkflowFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_clone_keeps_keys_and_remaps_ids() {
        let defs = definitions();
        let def = defs.deploy(&model("LEAVE"), "u1").unwrap();
        let copy = defs.clone_workflow(&def.workflow.id, "LEAVE2", "Leave v2", "u2").unwrap();
        assert_eq!(node_keys(&copy), node_keys(&def));
        assert!(copy.nodes.iter().all(|n| def.nodes.iter().all(|o| o.id != n.id)));
        assert!(copy.workflow.is_draft);
        assert_eq!(copy.workflow.created_by, "u2");
        assert!(copy.graph().is_ok());
    }

    #[test]
    fn test_publish_requires_start_and_end() {
        let defs = definitions();
        let mut m = model("NOEND");
        m.nodes.retain(|n| n.node_type != NodeType::End);
        m.edges.retain(|e| e.target != "end");
        let def = defs.deploy(&m, "u1").unwrap();
        assert!(matches!(defs.publish(&def.workflow.id, "admin"), Err(FilingError::DomainRule(_))));

        let def = defs.deploy(&model("OK"), "u1").unwrap();
        let w = defs.publish(&def.workflow.id, "admin").unwrap();
        assert!(w.is_published && w.is_active && !w.is_draft);
        assert_eq!(w.version, 2);
        assert_eq!(w.published_by.as_deref(), Some("admin"));
    }

    #[test]
    fn test_node_and_edge_editing() {
        let defs = definitions();
        let def = defs.deploy(&model("EDIT"), "u1").unwrap();
        let wid = def.workflow.id.clone();

        let hold = defs.add_node(&wid, &NodeModel::new("hold", NodeType::Task, "Hold")).unwrap();
        assert!(matches!(defs.add_node(&wid, &NodeModel::new("hold", NodeType::Task, "Hold")), Err(FilingError::DomainRule(_))));
        defs.add_edge(&wid, &EdgeModel::new("review", "hold").with_label("hold")).unwrap();
        defs.add_edge(&wid, &EdgeModel::new("hold", "review")).unwrap();
        assert!(matches!(defs.add_edge(&wid, &EdgeModel::new("hold", "ghost")), Err(FilingError::DomainRule(_))));
        assert_eq!(defs.get_workflow(&wid).unwrap().edges.len(), 5);

        let renamed = defs.update_node(&hold.id, &NodeModel::new("hold", NodeType::Task, "On hold")).unwrap();
        assert_eq!(renamed.id, hold.id);
        assert_eq!(renamed.label, "On hold");

        defs.remove_node(&hold.id).unwrap();
        let after = defs.get_workflow(&wid).unwrap();
        assert_eq!(after.nodes.len(), 3);
        assert_eq!(after.edges.len(), 3);
    }

    #[test]
    fn test_definition_order_survives_round_trips() {
        let defs = definitions();
        let mut m = model("ORDER");
        for i in (0..20).rev() {
            m.nodes.push(NodeModel::new(&format!("t{:02}", i), NodeType::Task, "Task"));
            m.edges.push(EdgeModel::new("review", &format!("t{:02}", i)).with_label(&format!("go{}", i)));
        }
        let keys: Vec<String> = m.nodes.iter().map(|n| n.id.clone()).collect();
        let targets: Vec<String> = m.edges.iter().map(|e| e.target.clone()).collect();

        let def = defs.deploy(&m, "u1").unwrap();
        assert_eq!(def.nodes.iter().map(|n| n.nid.clone()).collect::<Vec<_>>(), keys);
        let exported = defs.export(&def.workflow.id).unwrap();
        assert_eq!(exported.edges.iter().map(|e| e.target.clone()).collect::<Vec<_>>(), targets);

        let copy = defs.clone_workflow(&def.workflow.id, "ORDER2", "Order v2", "u1").unwrap();
        assert_eq!(copy.nodes.iter().map(|n| n.nid.clone()).collect::<Vec<_>>(), keys);

        let extra = defs.add_node(&def.workflow.id, &NodeModel::new("late", NodeType::Task, "Late")).unwrap();
        assert_eq!(extra.seq, keys.len() as i64);
        assert_eq!(defs.get_workflow(&def.workflow.id).unwrap().nodes.last().map(|n| n.nid.as_str()), Some("late"));
    }

    #[test]
    fn test_set_active_requires_publish() {
        let defs = definitions();
        let def = defs.deploy(&model("ACT"), "u1").unwrap();
        assert!(matches!(defs.set_active(&def.workflow.id, true), Err(FilingError::InvalidState(_))));
        defs.publish(&def.workflow.id, "admin").unwrap();
        let w = defs.set_active(&def.workflow.id, false).unwrap();
        assert!(!w.is_active);
        let listed = defs
            .list_workflows(WorkflowFilter {
                is_active: Some(false),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn test_delete_cascades() {
        let defs = definitions();
        let def = defs.deploy(&model("DEL"), "u1").unwrap();
        defs.delete_workflow(&def.workflow.id).unwrap();
        assert!(matches!(defs.get_workflow(&def.workflow.id), Err(FilingError::NotFound(_))));
        assert!(defs.nodes_of(&def.workflow.id).unwrap().is_empty());
        assert!(defs.edges_of(&def.workflow.id).unwrap().is_empty());
    }
}
