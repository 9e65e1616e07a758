//! Images domain state

use std::sync::Arc;

use crate::handles::HandleCache;
use crate::health::HealthMonitor;
use crate::pipeline::GenerationService;
use crate::repository::ImageRepository;

/// Application state for the Images domain
#[derive(Clone)]
pub struct ImagesState {
    pub repo: ImageRepository,
    pub handles: Arc<HandleCache>,
    pub generator: GenerationService,
    pub monitor: HealthMonitor,
}
