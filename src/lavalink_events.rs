use lavalink_rs::{client::LavalinkClient, hook, model::events};

#[hook]
pub async fn ready_event(client: LavalinkClient, session_id: String, event: &events::Ready) {
    if let Err(error) = client.delete_all_player_contexts().await {
        tracing::error!(?error, "Failed to clear stale player contexts");
    }
    tracing::info!(%session_id, resumed = event.resumed, "Lavalink node ready");
}

#[hook]
pub async fn track_start(_client: LavalinkClient, _session_id: String, event: &events::TrackStart) {
    tracing::info!(
        guild_id = ?event.guild_id,
        title = %event.track.info.title,
        "Track started"
    );
}

#[hook]
pub async fn track_exception(
    _client: LavalinkClient,
    _session_id: String,
    event: &events::TrackException,
) {
    tracing::warn!(
        guild_id = ?event.guild_id,
        title = %event.track.info.title,
        exception = ?event.exception,
        "Track failed to play"
    );
}
