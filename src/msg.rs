use std::path::PathBuf;

/// Events delivered to the watch loop.
#[derive(Debug)]
pub enum Msg {
    /// The watched document was created, modified or removed.
    FileChanged(PathBuf),
    /// The watcher reported an error; watching continues.
    WatchError(String),
}
