use crate::model::{Infobase, Session};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::{debug, info};

/// Inputs to the activity rule besides the entities themselves.
///
/// The threshold is carried for age-based decisions; the rule in force marks
/// an infobase inactive only when it has no sessions at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationPolicy {
    pub now: NaiveDateTime,
    pub inactivity_threshold: chrono::Duration,
}

impl CorrelationPolicy {
    pub fn new(now: NaiveDateTime, inactivity_threshold: chrono::Duration) -> Self {
        Self {
            now,
            inactivity_threshold,
        }
    }

    /// Oldest activity time still inside the threshold window, or `None`
    /// when the threshold reaches past the representable range
    pub fn cutoff(&self) -> Option<NaiveDateTime> {
        self.now.checked_sub_signed(self.inactivity_threshold)
    }
}

#[derive(Default)]
struct SessionStats {
    count: usize,
    last_active: Option<NaiveDateTime>,
}

/// Attach session statistics to `infobases` and return the inactive ones.
///
/// Sessions whose `infobase_id` matches no infobase are ignored. The result
/// keeps the order of `infobases`.
pub fn correlate<'a>(
    infobases: &'a mut [Infobase],
    sessions: &[Session],
    policy: &CorrelationPolicy,
) -> Vec<&'a Infobase> {
    let mut stats: HashMap<&str, SessionStats> = HashMap::new();
    for session in sessions {
        let entry = stats.entry(session.infobase_id.as_str()).or_default();
        entry.count += 1;
        if let Some(at) = session.last_active_at {
            entry.last_active = Some(entry.last_active.map_or(at, |current| current.max(at)));
        }
    }

    debug!(
        "Correlating {} session(s) against {} infobase(s), threshold cutoff {:?}",
        sessions.len(),
        infobases.len(),
        policy.cutoff()
    );

    for infobase in infobases.iter_mut() {
        let group = stats.get(infobase.id.as_str());
        infobase.sessions_count = group.map_or(0, |g| g.count);
        infobase.last_session_time = group.and_then(|g| g.last_active);
        infobase.is_inactive = infobase.sessions_count == 0;

        if infobase.is_inactive {
            info!("Infobase '{}' is inactive (no sessions)", infobase.name);
        }
    }

    let infobases: &'a [Infobase] = infobases;
    infobases.iter().filter(|ib| ib.is_inactive).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn policy() -> CorrelationPolicy {
        CorrelationPolicy::new(at(12, 0), chrono::Duration::hours(24))
    }

    fn infobase(id: &str) -> Infobase {
        Infobase {
            id: id.to_string(),
            name: format!("{id}-name"),
            ..Default::default()
        }
    }

    fn session(id: &str, infobase_id: &str, last_active_at: Option<NaiveDateTime>) -> Session {
        Session {
            id: id.to_string(),
            infobase_id: infobase_id.to_string(),
            last_active_at,
            ..Default::default()
        }
    }

    #[test]
    fn test_counts_and_inactive_subset() {
        let mut infobases = vec![infobase("ib1"), infobase("ib2"), infobase("ib3")];
        let sessions = vec![
            session("s1", "ib1", None),
            session("s2", "ib1", None),
            session("s3", "ib2", None),
        ];

        let inactive: Vec<String> = correlate(&mut infobases, &sessions, &policy())
            .into_iter()
            .map(|ib| ib.id.clone())
            .collect();

        assert_eq!(inactive, ["ib3"]);
        assert_eq!(infobases[0].sessions_count, 2);
        assert!(!infobases[0].is_inactive);
        assert_eq!(infobases[1].sessions_count, 1);
        assert!(!infobases[1].is_inactive);
        assert_eq!(infobases[2].sessions_count, 0);
        assert!(infobases[2].is_inactive);
    }

    #[test]
    fn test_last_session_time_is_maximum_present_value() {
        let mut infobases = vec![infobase("ib1"), infobase("ib2")];
        let sessions = vec![
            session("s1", "ib1", Some(at(9, 15))),
            session("s2", "ib1", None),
            session("s3", "ib1", Some(at(11, 40))),
            session("s4", "ib1", Some(at(10, 5))),
            session("s5", "ib2", None),
        ];

        correlate(&mut infobases, &sessions, &policy());

        assert_eq!(infobases[0].last_session_time, Some(at(11, 40)));
        assert_eq!(infobases[1].last_session_time, None);
        assert!(!infobases[1].is_inactive);
    }

    #[test]
    fn test_unmatched_sessions_are_ignored() {
        let mut infobases = vec![infobase("ib1"), infobase("ib2")];
        let sessions = vec![
            session("s1", "ib1", None),
            session("s2", "orphan", Some(at(8, 0))),
            session("s3", "", None),
        ];

        let inactive = correlate(&mut infobases, &sessions, &policy()).len();

        let total: usize = infobases.iter().map(|ib| ib.sessions_count).sum();
        assert_eq!(total, 1);
        assert_eq!(inactive, 1);
    }

    #[test]
    fn test_inactive_subset_keeps_input_order() {
        let mut infobases = vec![infobase("z"), infobase("a"), infobase("m")];

        let inactive: Vec<&str> = correlate(&mut infobases, &[], &policy())
            .into_iter()
            .map(|ib| ib.id.as_str())
            .collect();

        assert_eq!(inactive, ["z", "a", "m"]);
    }

    #[test]
    fn test_old_activity_does_not_make_infobase_inactive() {
        let mut infobases = vec![infobase("ib1")];
        let long_ago = at(12, 0) - chrono::Duration::days(30);
        let sessions = vec![session("s1", "ib1", Some(long_ago))];

        let inactive = correlate(&mut infobases, &sessions, &policy());

        assert!(inactive.is_empty());
        assert!(long_ago < policy().cutoff().unwrap());
    }

    #[test]
    fn test_rerun_overwrites_derived_fields() {
        let mut infobases = vec![infobase("ib1")];
        correlate(&mut infobases, &[session("s1", "ib1", Some(at(9, 0)))], &policy());
        correlate(&mut infobases, &[], &policy());

        assert_eq!(infobases[0].sessions_count, 0);
        assert!(infobases[0].last_session_time.is_none());
        assert!(infobases[0].is_inactive);
    }

    #[test]
    fn test_returned_subset_matches_flags() {
        let mut infobases = vec![infobase("ib1"), infobase("ib2"), infobase("ib3")];
        let sessions = vec![session("s1", "ib2", None)];

        let returned: Vec<String> = correlate(&mut infobases, &sessions, &policy())
            .into_iter()
            .map(|ib| ib.id.clone())
            .collect();
        let flagged: Vec<String> = infobases
            .iter()
            .filter(|ib| ib.is_inactive)
            .map(|ib| ib.id.clone())
            .collect();

        assert_eq!(returned, flagged);
        assert_eq!(returned, ["ib1", "ib3"]);
    }

    #[test]
    fn test_huge_threshold_has_no_cutoff() {
        let policy = CorrelationPolicy::new(at(12, 0), chrono::Duration::hours(i64::from(u32::MAX)));
        assert!(policy.cutoff().is_none());

        let mut infobases = vec![infobase("ib1")];
        let inactive = correlate(&mut infobases, &[], &policy);
        assert_eq!(inactive.len(), 1);
    }
}
