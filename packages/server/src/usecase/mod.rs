//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod broadcast;
pub mod handle_message;
pub mod join_board;
pub mod leave_board;

pub use broadcast::BroadcastService;
pub use handle_message::HandleMessageUseCase;
pub use join_board::JoinBoardUseCase;
pub use leave_board::LeaveBoardUseCase;
