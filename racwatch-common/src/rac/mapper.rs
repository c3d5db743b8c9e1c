use crate::model::{Cluster, Infobase, Server, Session};
use crate::rac::parser::{self, Record};
use chrono::{NaiveDate, NaiveDateTime};

/// Build an entity from a parsed `rac` record.
///
/// Mapping never fails: absent keys become empty strings or `false`.
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Self;
}

impl FromRecord for Cluster {
    fn from_record(record: &Record) -> Self {
        Self {
            id: record.get("cluster").to_string(),
            host: record.get("host").to_string(),
            port: record.get("port").to_string(),
            name: record.get("name").to_string(),
        }
    }
}

impl FromRecord for Server {
    fn from_record(record: &Record) -> Self {
        Self {
            id: record.get("server").to_string(),
            name: record.get("name").to_string(),
            host: record.get("host").to_string(),
            port: record.get("port").to_string(),
            port_range: record.get("port-range").to_string(),
            cluster_port: record.get("cluster-port").to_string(),
        }
    }
}

impl FromRecord for Infobase {
    fn from_record(record: &Record) -> Self {
        Self {
            id: record.get("infobase").to_string(),
            name: record.get("name").to_string(),
            description: record.get("descr").to_string(),
            sessions_deny: parse_flag(record.get("sessions-deny")),
            scheduled_jobs_deny: parse_flag(record.get("scheduled-jobs-deny")),
            ..Default::default()
        }
    }
}

impl FromRecord for Session {
    fn from_record(record: &Record) -> Self {
        Self {
            id: record.get("session").to_string(),
            infobase_id: record.get("infobase").to_string(),
            user_name: record.get("user-name").to_string(),
            app_id: record.get("app-id").to_string(),
            started_at: parse_timestamp(record.get("started-at")),
            last_active_at: parse_timestamp(record.get("last-active-at")),
        }
    }
}

/// Parse `text` and map every record to `T`
pub fn parse_entities<T: FromRecord>(text: &str) -> Vec<T> {
    parser::parse(text).iter().map(T::from_record).collect()
}

/// `on` (any case) is true, everything else false
fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("on")
}

/// Parse a `rac` timestamp such as `2024-01-15T10:30:00`.
///
/// A `T` separator is normalised to a space first. Values that do not parse
/// yield `None`.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let normalized = value.replacen('T', " ", 1);

    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_cluster_scenario() {
        let clusters: Vec<Cluster> =
            parse_entities("cluster: c1\nhost: srv1\nport: 1540\nname: Main\n");

        assert_eq!(
            clusters,
            vec![Cluster {
                id: "c1".to_string(),
                host: "srv1".to_string(),
                port: "1540".to_string(),
                name: "Main".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let servers: Vec<Server> = parse_entities("server: s1\n");
        assert_eq!(servers[0].id, "s1");
        assert_eq!(servers[0].name, "");
        assert_eq!(servers[0].port_range, "");

        let infobases: Vec<Infobase> = parse_entities("name: HR\n");
        assert_eq!(infobases[0].id, "");
        assert!(!infobases[0].sessions_deny);
        assert_eq!(infobases[0].sessions_count, 0);
        assert!(infobases[0].last_session_time.is_none());
    }

    #[test]
    fn test_server_hyphenated_keys() {
        let servers: Vec<Server> =
            parse_entities("server : s1\nname : Central\nport-range : 1560:1591\ncluster-port : 1541\n");
        assert_eq!(servers[0].port_range, "1560:1591");
        assert_eq!(servers[0].cluster_port, "1541");
    }

    #[test]
    fn test_infobase_flags() {
        let infobases: Vec<Infobase> = parse_entities(
            "infobase : ib1\nname : Acc\ndescr : \"Main books\"\nsessions-deny : on\nscheduled-jobs-deny : off\n",
        );
        assert_eq!(infobases[0].description, "\"Main books\"");
        assert!(infobases[0].sessions_deny);
        assert!(!infobases[0].scheduled_jobs_deny);
    }

    #[test]
    fn test_session_timestamps() {
        let sessions: Vec<Session> = parse_entities(
            "session : s1\ninfobase : ib1\nuser-name : Ivanov\napp-id : 1CV8C\n\
             started-at : 2024-01-15T09:00:00\nlast-active-at : 2024-01-15T10:30:00\n",
        );
        let session = &sessions[0];
        assert_eq!(session.infobase_id, "ib1");
        assert_eq!(session.user_name, "Ivanov");
        assert_eq!(session.app_id, "1CV8C");
        assert_eq!(session.started_at, Some(ts("2024-01-15 09:00:00")));
        assert_eq!(session.last_active_at, Some(ts("2024-01-15 10:30:00")));
    }

    #[test]
    fn test_invalid_timestamp_is_dropped() {
        let sessions: Vec<Session> =
            parse_entities("session : s1\nstarted-at : yesterday\nlast-active-at :\n");
        assert!(sessions[0].started_at.is_none());
        assert!(sessions[0].last_active_at.is_none());
    }

    #[test]
    fn test_timestamp_forms() {
        assert_eq!(
            parse_timestamp("2024-01-15 10:30:00"),
            Some(ts("2024-01-15 10:30:00"))
        );
        assert_eq!(
            parse_timestamp("2024-01-15T10:30"),
            Some(ts("2024-01-15 10:30:00"))
        );
        assert_eq!(parse_timestamp("2024-01-15"), Some(ts("2024-01-15 00:00:00")));
        assert!(parse_timestamp("2024-01-15T10:30:00.250").is_some());
        assert!(parse_timestamp("0001-99-99T00:00:00").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
