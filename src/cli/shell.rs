use colored::Colorize;

use crate::session::{Notice, NoticeLevel, Route, Shell};

/// Terminal front end for session notices and navigation hints
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleShell;

impl Shell for ConsoleShell {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("{}", notice.message.green()),
            NoticeLevel::Info => eprintln!("{}", notice.message.yellow()),
            NoticeLevel::Error => eprintln!("{}", notice.message.red()),
        }
    }

    fn navigate(&self, route: Route) {
        let hint = match route {
            Route::Login { session_expired: true } => "run `eventhub login` to continue",
            Route::Login { session_expired: false } => "logged out",
            Route::Landing | Route::Events => "try `eventhub events list`",
        };
        eprintln!("{}", format!("-> {} ({})", route, hint).dimmed());
    }
}
