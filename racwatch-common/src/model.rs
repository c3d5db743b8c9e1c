use chrono::NaiveDateTime;

/// A cluster registered with the RAS service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cluster {
    pub id: String,
    pub host: String,
    pub port: String,
    pub name: String,
}

/// A working server of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: String,
    pub port_range: String,
    pub cluster_port: String,
}

/// An infobase hosted by a cluster.
///
/// `sessions_count`, `last_session_time` and `is_inactive` are filled in by
/// [`crate::correlate::correlate`]; everything else comes from `rac` output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Infobase {
    pub id: String,
    pub name: String,
    pub description: String,
    pub sessions_deny: bool,
    pub scheduled_jobs_deny: bool,
    pub sessions_count: usize,
    pub last_session_time: Option<NaiveDateTime>,
    pub is_inactive: bool,
}

/// A client session attached to an infobase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    /// Id of the owning infobase. Not guaranteed to resolve.
    pub infobase_id: String,
    pub user_name: String,
    pub app_id: String,
    pub started_at: Option<NaiveDateTime>,
    pub last_active_at: Option<NaiveDateTime>,
}

/// Everything collected for one cluster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterSnapshot {
    pub cluster: Cluster,
    pub servers: Vec<Server>,
    pub infobases: Vec<Infobase>,
    pub sessions: Vec<Session>,
}

impl ClusterSnapshot {
    pub fn new(cluster: Cluster) -> Self {
        Self {
            cluster,
            ..Default::default()
        }
    }
}

/// An inactive infobase together with the cluster it belongs to
#[derive(Debug, Clone, Copy)]
pub struct InactiveInfobase<'a> {
    pub cluster_id: &'a str,
    pub infobase: &'a Infobase,
}

/// Point-in-time view of all clusters produced by one collection pass.
///
/// Servers, infobases and sessions are grouped under their owning cluster;
/// the flat accessors walk the groups in collection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    generated_at: NaiveDateTime,
    clusters: Vec<ClusterSnapshot>,
    errors: Vec<String>,
}

impl Snapshot {
    pub fn builder(generated_at: NaiveDateTime) -> SnapshotBuilder {
        SnapshotBuilder::new(generated_at)
    }

    pub fn generated_at(&self) -> NaiveDateTime {
        self.generated_at
    }

    pub fn groups(&self) -> &[ClusterSnapshot] {
        &self.clusters
    }

    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter().map(|group| &group.cluster)
    }

    pub fn servers(&self) -> impl Iterator<Item = &Server> {
        self.clusters.iter().flat_map(|group| group.servers.iter())
    }

    pub fn infobases(&self) -> impl Iterator<Item = &Infobase> {
        self.clusters.iter().flat_map(|group| group.infobases.iter())
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.clusters.iter().flat_map(|group| group.sessions.iter())
    }

    pub fn session_count(&self) -> usize {
        self.clusters.iter().map(|group| group.sessions.len()).sum()
    }

    /// Inactive infobases in snapshot order, each tagged with its cluster id
    pub fn inactive_infobases(&self) -> Vec<InactiveInfobase<'_>> {
        self.clusters
            .iter()
            .flat_map(|group| {
                group
                    .infobases
                    .iter()
                    .filter(|ib| ib.is_inactive)
                    .map(move |infobase| InactiveInfobase {
                        cluster_id: &group.cluster.id,
                        infobase,
                    })
            })
            .collect()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// Accumulates a [`Snapshot`] during a collection pass
#[derive(Debug)]
pub struct SnapshotBuilder {
    generated_at: NaiveDateTime,
    clusters: Vec<ClusterSnapshot>,
    errors: Vec<String>,
}

impl SnapshotBuilder {
    pub fn new(generated_at: NaiveDateTime) -> Self {
        Self {
            generated_at,
            clusters: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn push_cluster(&mut self, group: ClusterSnapshot) {
        self.clusters.push(group);
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    #[must_use]
    pub fn with_cluster(mut self, group: ClusterSnapshot) -> Self {
        self.push_cluster(group);
        self
    }

    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.record_error(message);
        self
    }

    pub fn finish(self) -> Snapshot {
        Snapshot {
            generated_at: self.generated_at,
            clusters: self.clusters,
            errors: self.errors,
        }
    }
}
