//! Data fetching seam between coordinators and the API client

use async_trait::async_trait;

use raise3d_api::{ApiResult, PrinterClient};
use raise3d_core::ApiData;
use raise3d_entities::PollTarget;

/// Source of endpoint payloads
///
/// Implemented by the printer client; tests substitute an in-memory fake.
#[async_trait]
pub trait DataFetcher: Send + Sync + 'static {
    async fn fetch(&self, target: PollTarget) -> ApiResult<ApiData>;
}

#[async_trait]
impl DataFetcher for PrinterClient {
    async fn fetch(&self, target: PollTarget) -> ApiResult<ApiData> {
        match target {
            PollTarget::SystemInfo => self.get_system_info().await,
            PollTarget::CameraInfo => self.get_camera_info().await,
            PollTarget::RunningStatus => self.get_running_status().await,
            PollTarget::BasicInfo => self.get_basic_info().await,
            PollTarget::LeftNozzle => self.get_left_nozzle_info().await,
            PollTarget::RightNozzle => self.get_right_nozzle_info().await,
            PollTarget::CurrentJob => self.get_current_job().await,
            PollTarget::Statistics => self.get_statistics().await,
        }
    }
}
