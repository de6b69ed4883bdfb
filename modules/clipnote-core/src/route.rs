//! Provider routing: maps a classified request to an execution plan. The
//! only multi-provider case is a thread post embedding a video link, which
//! fans out to both the thread and video providers concurrently.

use clipnote_common::{ClassifiedRequest, ContentType};

/// Which provider/model slot handles an analysis leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderRole {
    Thread,
    Video,
    Article,
    Topic,
}

/// Whose fields win when two fragments disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePriority {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionPlan {
    Single(ProviderRole),
    Dual {
        primary: ProviderRole,
        secondary: ProviderRole,
        /// Normalized URL of the embedded video, analyzed by the secondary.
        video_url: String,
        priority: MergePriority,
    },
}

/// Build the execution plan for a classified request.
pub fn route(req: &ClassifiedRequest) -> ExecutionPlan {
    match req.content_type {
        ContentType::ThreadPost => {
            // A quoted video gets its own analysis leg; the thread's framing
            // still outranks the video's when the fragments disagree.
            if let Some(video) = req.embedded_ref(ContentType::Video) {
                return ExecutionPlan::Dual {
                    primary: ProviderRole::Thread,
                    secondary: ProviderRole::Video,
                    video_url: video.url.clone(),
                    priority: MergePriority::Primary,
                };
            }
            ExecutionPlan::Single(ProviderRole::Thread)
        }
        ContentType::Video => ExecutionPlan::Single(ProviderRole::Video),
        ContentType::Article => ExecutionPlan::Single(ProviderRole::Article),
        ContentType::FreeformTopic => ExecutionPlan::Single(ProviderRole::Topic),
    }
}
