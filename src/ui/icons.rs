//! Shared status icons with plain-text fallbacks.

use console::Emoji;

pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static CAMERA: Emoji<'_, '_> = Emoji("🎥 ", "[REC]");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏱️  ", "[T]");
pub static BROOM: Emoji<'_, '_> = Emoji("🧹 ", "[CLEAN]");
pub static INBOX: Emoji<'_, '_> = Emoji("📥 ", "[QUEUE]");
