//! Events delivered from the background analysis task to the UI thread.

use crate::analysis::AnalysisResult;
use crate::scene::RequestToken;

/// Outcome of one analysis request, sent through a channel from the
/// worker thread. The token identifies the request so that stale
/// completions can be dropped by the scene controller.
pub(crate) enum AnalysisEvent {
    Succeeded {
        token: RequestToken,
        result: Box<AnalysisResult>,
    },
    Failed {
        token: RequestToken,
        message: String,
    },
}
