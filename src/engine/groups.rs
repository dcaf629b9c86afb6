use std::collections::HashMap;

use thiserror::Error;

pub const DEFAULT_SESSION_GROUPS: &str = "morning:Class1,Class2;evening:Class3,Class4";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroupParseError {
    #[error("session group '{0}' must look like name:session,session")]
    Malformed(String),
    #[error("session group '{0}' lists no sessions")]
    Empty(String),
}

/// Sessions of which a user may attend only one per day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGroup {
    pub name: String,
    pub sessions: Vec<String>,
}

impl SessionGroup {
    pub fn contains(&self, session: &str) -> bool {
        self.sessions.iter().any(|s| s == session)
    }

    /// Every member except `session`.
    pub fn others(&self, session: &str) -> Vec<String> {
        self.sessions
            .iter()
            .filter(|s| s.as_str() != session)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionGroups {
    groups: Vec<SessionGroup>,
}

impl SessionGroups {
    pub fn new(groups: Vec<SessionGroup>) -> Self {
        Self { groups }
    }

    /// Parses `name:a,b;other:c,d`. Blank input yields no groups.
    pub fn parse(raw: &str) -> Result<Self, GroupParseError> {
        let groups = raw
            .split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (name, sessions) = part
                    .split_once(':')
                    .ok_or_else(|| GroupParseError::Malformed(part.to_string()))?;
                let name = name.trim();
                if name.is_empty() {
                    return Err(GroupParseError::Malformed(part.to_string()));
                }

                let mut members: Vec<String> = Vec::new();
                for session in sessions.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    if !members.iter().any(|m| m == session) {
                        members.push(session.to_string());
                    }
                }
                if members.is_empty() {
                    return Err(GroupParseError::Empty(name.to_string()));
                }

                Ok(SessionGroup {
                    name: name.to_string(),
                    sessions: members,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[SessionGroup] {
        &self.groups
    }

    /// First group listing `session`, in configuration order.
    pub fn group_of(&self, session: &str) -> Option<&SessionGroup> {
        self.groups.iter().find(|g| g.contains(session))
    }

    /// Sessions listed under more than one group, with the groups naming them.
    pub fn overlaps(&self) -> Vec<(String, Vec<String>)> {
        let mut seen: HashMap<&str, Vec<String>> = HashMap::new();
        for group in &self.groups {
            for session in &group.sessions {
                seen.entry(session.as_str()).or_default().push(group.name.clone());
            }
        }

        let mut overlaps: Vec<(String, Vec<String>)> = seen
            .into_iter()
            .filter(|(_, groups)| groups.len() > 1)
            .map(|(session, groups)| (session.to_string(), groups))
            .collect();
        overlaps.sort();
        overlaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_groups() {
        let groups = SessionGroups::parse(DEFAULT_SESSION_GROUPS).unwrap();

        assert_eq!(groups.groups().len(), 2);
        assert_eq!(groups.group_of("Class2").unwrap().name, "morning");
        assert_eq!(groups.group_of("Class3").unwrap().name, "evening");
        assert!(groups.group_of("Workshop").is_none());
        assert!(groups.overlaps().is_empty());
    }

    #[test]
    fn test_others_excludes_requested_session() {
        let groups = SessionGroups::parse("am: A, B ,C").unwrap();
        let group = groups.group_of("B").unwrap();

        assert_eq!(group.others("B"), vec!["A".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_overlaps_are_reported_not_rejected() {
        let groups = SessionGroups::parse("a:X,Y;b:Y,Z").unwrap();

        assert_eq!(groups.group_of("Y").unwrap().name, "a");
        assert_eq!(
            groups.overlaps(),
            vec![("Y".to_string(), vec!["a".to_string(), "b".to_string()])]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            SessionGroups::parse("morning"),
            Err(GroupParseError::Malformed("morning".into()))
        );
        assert_eq!(
            SessionGroups::parse("morning: ,"),
            Err(GroupParseError::Empty("morning".into()))
        );
        assert!(SessionGroups::parse("").unwrap().groups().is_empty());
    }
}
