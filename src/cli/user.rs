//! Default user name

use anyhow::Result;

use crate::config::SETTING_USER_NAME;
use crate::db::Database;

/// Show the stored user name, or replace it
pub fn run_user(db: &Database, name: Option<&str>) -> Result<()> {
    match name.map(str::trim) {
        Some("") => println!("User name cannot be empty."),
        Some(name) => {
            db.set_setting(SETTING_USER_NAME, name)?;
            tracing::info!(user = name, "default user changed");
            println!("User: {}", name);
        }
        None => match db.get_setting(SETTING_USER_NAME)? {
            Some(name) => println!("User: {}", name),
            None => println!("No default user. Run `dayplan user <name>`."),
        },
    }
    Ok(())
}
