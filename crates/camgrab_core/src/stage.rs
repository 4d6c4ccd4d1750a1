/// Position of a tick within the grab cycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Start,
    Fetching,
    Decoding,
    Dispatching,
    Done,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::Fetching => "fetching",
            Stage::Decoding => "decoding",
            Stage::Dispatching => "dispatching",
            Stage::Done => "done",
        }
    }
}
