use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeType {
    Start,
    Task,
    Decision,
    End,
}

impl NodeType {
    /// Start and end nodes are terminals; everything else must be wired on both sides.
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeType::Start | NodeType::End)
    }
}

/// How the user responsible for a task node is found.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssigneeType {
    /// first active user holding the role in the file's department
    Role,
    /// the value is the user id
    User,
    /// first active admin of the department named by the value
    Department,
    /// the file's current assignee, else its creator
    Dynamic,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub fn seconds(&self) -> i64 {
        match self {
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 3_600,
            TimeUnit::Days => 86_400,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_node_type_strings() {
        assert_eq!(NodeType::Decision.as_ref(), "decision");
        assert_eq!(NodeType::from_str("end").unwrap(), NodeType::End);
        assert!(NodeType::from_str("fork").is_err());
        assert_eq!(serde_json::to_string(&AssigneeType::Department).unwrap(), r#""department""#);
    }

    #[test]
    fn test_terminal_types() {
        assert!(NodeType::Start.is_terminal());
        assert!(NodeType::End.is_terminal());
        assert!(!NodeType::Task.is_terminal());
        assert!(!NodeType::Decision.is_terminal());
    }
}
