// ABOUTME: Structural template diff, consumed only as a yes/no approval signal.

use crate::assembly::Template;
use crate::cloud::RequireApproval;

pub trait TemplateDiff: Send + Sync {
    /// Whether moving from `current` to `desired` needs approval at `level`.
    /// Implementations render the diff to the user as a side effect.
    fn requires_approval(
        &self,
        current: &Template,
        desired: &Template,
        level: RequireApproval,
    ) -> bool;
}
