//! Shared UI icons.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[WARN]");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[i]");

// Suite indicators
pub static REVIEW: Emoji<'_, '_> = Emoji("🔍 ", "[R]");
pub static SYNTHESIS: Emoji<'_, '_> = Emoji("🧩 ", "[S]");
pub static FRESH: Emoji<'_, '_> = Emoji("👀 ", "[F]");
