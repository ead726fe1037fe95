/// Progression of one orchestrated run. The failed flag lives next to this
/// on the orchestrator; any transition's error can set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    NotStarted,
    SettingUp,
    Running,
    TearingDown,
    Done,
}
