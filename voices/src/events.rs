use serde::Serialize;

use crate::reconcile::VoiceItem;
use crate::transfer::TransferJob;

/// Notifications for the presentation layer, emitted on the engine's thread.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum VoiceEvent {
    ListRefreshed {
        items: Vec<VoiceItem>,
    },
    ItemUpdated {
        item: VoiceItem,
    },
    TransferProgress {
        filename: String,
        percent: u8,
    },
    TransferFinished {
        job: TransferJob,
        error: Option<String>,
    },
    Status {
        message: String,
        is_error: bool,
    },
}
