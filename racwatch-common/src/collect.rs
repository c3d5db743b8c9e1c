use crate::correlate::{correlate, CorrelationPolicy};
use crate::model::{Cluster, ClusterSnapshot, Snapshot, SnapshotBuilder};
use crate::rac::{CommandRunner, Listing, RacClient};
use chrono::NaiveDateTime;
use tracing::{info, warn};

/// Runs one sequential collection pass over every cluster
pub struct Collector<'a, R> {
    client: &'a RacClient<R>,
    inactivity_threshold: chrono::Duration,
}

impl<'a, R: CommandRunner> Collector<'a, R> {
    pub fn new(client: &'a RacClient<R>, inactivity_threshold: chrono::Duration) -> Self {
        Self {
            client,
            inactivity_threshold,
        }
    }

    /// Collect a snapshot stamped with the current local time
    pub async fn collect(&self) -> Snapshot {
        self.collect_at(chrono::Local::now().naive_local()).await
    }

    /// Collect a snapshot stamped with `generated_at`.
    ///
    /// Never fails: a failed step leaves that part empty and adds a line to
    /// the snapshot's errors.
    #[tracing::instrument(name = "collect", skip(self))]
    pub async fn collect_at(&self, generated_at: NaiveDateTime) -> Snapshot {
        info!("Collecting cluster information");
        let mut builder = Snapshot::builder(generated_at);
        let policy = CorrelationPolicy::new(generated_at, self.inactivity_threshold);

        let clusters = take(&mut builder, self.client.clusters().await, "cluster list");

        for cluster in clusters {
            let group = self.collect_cluster(&mut builder, cluster, &policy).await;
            builder.push_cluster(group);
        }

        let snapshot = builder.finish();
        info!(
            "Collection finished: {} cluster(s), {} infobase(s), {} session(s), {} error(s)",
            snapshot.groups().len(),
            snapshot.infobases().count(),
            snapshot.session_count(),
            snapshot.errors().len()
        );
        snapshot
    }

    #[tracing::instrument(name = "collect.cluster", skip_all, fields(cluster_id = %cluster.id))]
    async fn collect_cluster(
        &self,
        builder: &mut SnapshotBuilder,
        cluster: Cluster,
        policy: &CorrelationPolicy,
    ) -> ClusterSnapshot {
        info!("Processing cluster: {} ({})", cluster.name, cluster.id);
        let mut group = ClusterSnapshot::new(cluster);
        let id = group.cluster.id.clone();

        group.servers = take(
            builder,
            self.client.servers(&id).await,
            &format!("server list for cluster {id}"),
        );
        group.infobases = take(
            builder,
            self.client.infobases(&id).await,
            &format!("infobase list for cluster {id}"),
        );
        group.sessions = take(
            builder,
            self.client.sessions(&id, None).await,
            &format!("session list for cluster {id}"),
        );

        let inactive = correlate(&mut group.infobases, &group.sessions, policy).len();
        info!(
            "Cluster {}: {} of {} infobase(s) inactive",
            id,
            inactive,
            group.infobases.len()
        );
        group
    }
}

/// Unwrap a listing, recording its failure in the snapshot
fn take<T>(builder: &mut SnapshotBuilder, listing: Listing<T>, step: &str) -> Vec<T> {
    let (items, failure) = listing.into_parts();
    if let Some(e) = failure {
        warn!("{} failed: {}", step, e);
        builder.record_error(format!("{step} failed: {e}"));
    }
    items
}
