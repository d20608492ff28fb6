use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{Res, spotify, types::PkceToken};

pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Res<()> {
    spotify::auth::auth(shared_state).await
}
