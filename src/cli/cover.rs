use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use crate::{
    Res,
    cli::ConsoleSink,
    import::{PlaylistProvisioner, RetryPolicy},
    spotify::SpotifyClient,
    success, warning,
};

/// Attaches a cover image to an existing playlist, e.g. after an import whose
/// cover upload failed.
pub async fn cover(playlist_id: String, image: PathBuf) -> Res<()> {
    let client = SpotifyClient::from_token_cache().await?;
    let sink = ConsoleSink::new(None)?;
    let retry = RetryPolicy::default();
    let cancel = CancellationToken::new();

    let provisioner = PlaylistProvisioner::new(&client, &sink, &retry, &cancel);
    if provisioner.attach_cover(&playlist_id, &image).await {
        success!("Cover of playlist {} updated.", playlist_id);
    } else {
        warning!("Cover of playlist {} left unchanged.", playlist_id);
    }

    Ok(())
}
