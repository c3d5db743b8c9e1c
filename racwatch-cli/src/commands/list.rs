use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use racwatch_common::rac::Listing;
use racwatch_common::{Collector, CommandRunner, RacClient, RacConfig};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ClusterRow {
    #[tabled(rename = "Cluster ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Port")]
    port: String,
}

#[derive(Tabled)]
struct InfobaseRow {
    #[tabled(rename = "Cluster")]
    cluster: String,
    #[tabled(rename = "Infobase ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Sessions")]
    sessions: usize,
    #[tabled(rename = "Last activity")]
    last_activity: String,
    #[tabled(rename = "State")]
    state: String,
}

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "Cluster")]
    cluster: String,
    #[tabled(rename = "Session ID")]
    id: String,
    #[tabled(rename = "Infobase ID")]
    infobase: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Application")]
    app: String,
    #[tabled(rename = "Started")]
    started: String,
    #[tabled(rename = "Last active")]
    last_active: String,
}

fn format_time(time: Option<NaiveDateTime>) -> String {
    time.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn required<T>(listing: Listing<T>, what: &str) -> Result<Vec<T>> {
    let (items, failure) = listing.into_parts();
    match failure {
        Some(e) => Err(e).with_context(|| format!("Failed to list {what}")),
        None => Ok(items),
    }
}

fn print_table<T: Tabled>(rows: Vec<T>, noun: &str) {
    let count = rows.len();
    let table = Table::new(rows).to_string();
    println!("{}", table);
    println!("\nTotal: {} {}", count, noun);
}

pub async fn clusters<R: CommandRunner>(client: &RacClient<R>) -> Result<()> {
    let clusters = required(client.clusters().await, "clusters")?;

    if clusters.is_empty() {
        println!("No clusters found");
        return Ok(());
    }

    let rows: Vec<ClusterRow> = clusters
        .into_iter()
        .map(|cluster| ClusterRow {
            id: cluster.id,
            name: cluster.name,
            host: cluster.host,
            port: cluster.port,
        })
        .collect();

    print_table(rows, "cluster(s)");
    Ok(())
}

pub async fn infobases<R: CommandRunner>(client: &RacClient<R>, config: &RacConfig) -> Result<()> {
    let snapshot = Collector::new(client, config.inactivity_threshold())
        .collect()
        .await;

    for error in snapshot.errors() {
        eprintln!("! {error}");
    }

    let rows: Vec<InfobaseRow> = snapshot
        .groups()
        .iter()
        .flat_map(|group| {
            group.infobases.iter().map(|infobase| InfobaseRow {
                cluster: group.cluster.name.clone(),
                id: infobase.id.clone(),
                name: infobase.name.clone(),
                sessions: infobase.sessions_count,
                last_activity: format_time(infobase.last_session_time),
                state: if infobase.is_inactive {
                    "Inactive".to_string()
                } else {
                    "Active".to_string()
                },
            })
        })
        .collect();

    if rows.is_empty() {
        println!("No infobases found");
        return Ok(());
    }

    print_table(rows, "infobase(s)");
    Ok(())
}

pub async fn sessions<R: CommandRunner>(
    client: &RacClient<R>,
    infobase: Option<&str>,
) -> Result<()> {
    let clusters = required(client.clusters().await, "clusters")?;

    let mut rows = Vec::new();
    for cluster in &clusters {
        let sessions = required(
            client.sessions(&cluster.id, infobase).await,
            &format!("sessions of cluster {}", cluster.id),
        )?;

        rows.extend(sessions.into_iter().map(|session| SessionRow {
            cluster: cluster.name.clone(),
            id: session.id,
            infobase: session.infobase_id,
            user: session.user_name,
            app: session.app_id,
            started: format_time(session.started_at),
            last_active: format_time(session.last_active_at),
        }));
    }

    if rows.is_empty() {
        println!("No active sessions");
        return Ok(());
    }

    print_table(rows, "session(s)");
    Ok(())
}
