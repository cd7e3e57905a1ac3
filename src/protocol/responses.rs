//! Chat responses
//!
//! Every string a client can see on the wire, plus the notice builders.

pub const SERVER_FULL: &str = "[SERVER IS FULL, PLEASE TRY AGAIN LATER]\n";
pub const ENTER_NAME: &str = "\n[ENTER YOUR NAME]: ";
pub const INVALID_NAME: &str = "[INVALID NAME, PLEASE ENTER A VALID NAME]: ";
pub const NAME_USED: &str = "[NAME IS USED, PLEASE ENTER ANOTHER NAME]: ";
pub const ENTER_NEW_NAME: &str = "[ENTER YOUR NEW NAME]: ";
pub const MESSAGE_LIMIT: &str = "[YOU HAVE EXCEEDED THE MESSAGE LIMIT]";

/// Command that starts a rename.
pub const RENAME_COMMAND: &str = "/name";

const WELCOME_LINES: &[&str] = &[
    "Welcome to TCP-Chat!",
    "         _nnnn_",
    "        dGGGGMMb",
    "       @p~qp~~qMb",
    "       M|@||@) M|",
    "       @,----.JM|",
    "      JS^\\__/  qKL",
    "     dZP        qKRb",
    "    dZP          qKKb",
    "   fZP            SMMb",
    "   HZM            MMMM",
    "   FqM            MMMM",
    " __| \".        |\\dS\"qML",
    " |    `.       | `' \\Zq",
    "_)      \\.___.,|     .'",
    "\\____   )MMMMMP|   .'",
    "     `-'       `--'",
];

/// Banner sent to every admitted connection before the name prompt
pub fn welcome_banner() -> String {
    WELCOME_LINES.join("\n")
}

pub fn join_notice(name: &str) -> String {
    format!("{} Has Joined The Chat", name)
}

pub fn leave_notice(name: &str) -> String {
    format!("{} Has Left The Chat", name)
}

pub fn rename_notice(old_name: &str, new_name: &str) -> String {
    format!("{} changed their name to {}", old_name, new_name)
}
