use axum::extract::FromRef;

use crate::config::Config;
use crate::scoring::QuizEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: QuizEngine,
    pub config: Config,
}

impl FromRef<AppState> for QuizEngine {
    fn from_ref(state: &AppState) -> Self {
        state.engine.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
