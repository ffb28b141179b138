use crate::{
    Result,
    collab::Directory,
    store::data::{File, Node},
    workflow::AssigneeType,
};

/// Finds the user responsible for `node` on `file`, if any.
pub fn resolve_assignee(
    node: &Node,
    file: &File,
    directory: &dyn Directory,
) -> Result<Option<String>> {
    let Some(assignee_type) = node.assignee_type else {
        return Ok(None);
    };
    let value = node.assignee_value.as_deref().filter(|v| !v.is_empty());

    let user = match (assignee_type, value) {
        (AssigneeType::Role, Some(role)) => directory.first_active_with_role(role, &file.department_id)?.map(|u| u.id),
        (AssigneeType::User, Some(user)) => Some(user.to_string()),
        (AssigneeType::Department, Some(department)) => directory.first_department_admin(department)?.map(|u| u.id),
        (AssigneeType::Dynamic, _) => Some(file.assigned_to.clone().unwrap_or_else(|| file.created_by.clone())),
        (_, None) => None,
    };
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collab::{MemDirectory, ROLE_DEPARTMENT_ADMIN, User},
        workflow::{NodeType, graph::tests::node},
    };

    fn task(
        assignee_type: AssigneeType,
        value: Option<&str>,
    ) -> Node {
        let mut n = node("review", NodeType::Task);
        n.assignee_type = Some(assignee_type);
        n.assignee_value = value.map(str::to_string);
        n
    }

    #[test]
    fn test_resolution_by_type() {
        let dir = MemDirectory::new();
        dir.add_user(User::new("so1", "Section officer").in_department("d1").with_role("section_officer"));
        dir.add_user(User::new("hod", "Head").in_department("d9").with_role(ROLE_DEPARTMENT_ADMIN));

        let mut file = File::new("F-1", "Leave", "d1", "creator");
        assert_eq!(resolve_assignee(&task(AssigneeType::Role, Some("section_officer")), &file, &dir).unwrap().as_deref(), Some("so1"));
        assert_eq!(resolve_assignee(&task(AssigneeType::User, Some("u42")), &file, &dir).unwrap().as_deref(), Some("u42"));
        assert_eq!(resolve_assignee(&task(AssigneeType::Department, Some("d9")), &file, &dir).unwrap().as_deref(), Some("hod"));
        assert_eq!(resolve_assignee(&task(AssigneeType::Dynamic, None), &file, &dir).unwrap().as_deref(), Some("creator"));
        file.assigned_to = Some("holder".to_string());
        assert_eq!(resolve_assignee(&task(AssigneeType::Dynamic, None), &file, &dir).unwrap().as_deref(), Some("holder"));
    }

    #[test]
    fn test_unresolved() {
        let dir = MemDirectory::new();
        let file = File::new("F-1", "Leave", "d1", "creator");
        assert!(resolve_assignee(&task(AssigneeType::Role, Some("registrar")), &file, &dir).unwrap().is_none());
        assert!(resolve_assignee(&task(AssigneeType::User, None), &file, &dir).unwrap().is_none());
        assert!(resolve_assignee(&node("review", NodeType::Task), &file, &dir).unwrap().is_none());
    }
}
