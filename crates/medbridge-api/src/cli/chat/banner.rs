//! Welcome banner display for chat sessions.
//!
//! Prints a styled banner when a session starts, showing the room,
//! speaker, target language, model, and where the credential came from.

use console::style;

use medbridge_core::conversation::SessionContext;

/// Print the welcome banner at the start of a chat session.
pub fn print_welcome_banner(ctx: &SessionContext, model: &str, credential: Option<&str>) {
    println!();
    println!(
        "  {} {}",
        style("+").green().bold(),
        style("MedBridge").cyan().bold()
    );
    println!(
        "  {}",
        style("Doctor / Patient translation log").dim()
    );
    println!();
    println!("  {}     {}", style("Room:").bold(), style(&ctx.room).dim());
    println!("  {}  {}", style("Speaker:").bold(), style(ctx.role).dim());
    println!(
        "  {} {}",
        style("Language:").bold(),
        style(&ctx.target_language).dim()
    );
    println!("  {}    {}", style("Model:").bold(), style(model).dim());
    println!(
        "  {}      {}",
        style("Key:").bold(),
        match credential {
            Some(source) => style(format!("from {source}")).dim(),
            None => style("missing".to_string()).yellow(),
        }
    );
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
