use super::*;
use crate::engine::selector::MoveSelector;
use crate::session::record::MemorySink;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn tc(minutes: u8) -> TimeControl {
    TimeControl::try_from(minutes).unwrap()
}

fn session_with(config: SessionConfig, engine: EngineConfig) -> (GameSession, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let session = GameSession::new(config, sink.clone(), Arc::new(engine));
    (session, sink)
}

fn session(config: SessionConfig) -> (GameSession, Arc<MemorySink>) {
    session_with(config, EngineConfig::instant())
}

fn compute(job: &AiJob) -> Result<Move, EngineError> {
    let mut selector = MoveSelector::seeded(Arc::new(EngineConfig::instant()), 11);
    selector
        .select_move(&job.position, job.difficulty.profile())
        .map(|(chosen, _)| chosen.mv)
}

#[test]
fn test_user_move_then_ai_reply() {
    let (mut session, sink) = session(SessionConfig::new(
        PieceColor::White,
        Difficulty::Easy,
        tc(5),
    ));
    let start = session.start().unwrap();
    assert!(start.ai_job.is_none());
    assert!(start.fen_error.is_none());
    assert_eq!(session.status(), SessionStatus::Active);

    for _ in 0..4 {
        session.tick();
    }
    let job = session.apply_user_move("e2", "e4").unwrap().unwrap();
    assert_eq!(session.status(), SessionStatus::AiThinking);
    assert_eq!(job.difficulty, Difficulty::Easy);
    assert_eq!(job.position.side_to_move(), PieceColor::Black);

    // Black's clock runs while the computer thinks.
    session.tick();
    assert_eq!(session.clock(), GameClock { white: 296, black: 299 });

    let next = session.apply_ai_result(job.ticket, compute(&job)).unwrap();
    assert!(next.is_none());
    assert_eq!(session.status(), SessionStatus::Active);
    assert_eq!(session.game().history().len(), 2);
    assert_eq!(session.game().turn(), PieceColor::White);
    assert!(sink.is_empty());
}

#[test]
fn test_black_user_waits_for_first_ai_move() {
    let (mut session, _) = session(SessionConfig::new(
        PieceColor::Black,
        Difficulty::Medium,
        tc(3),
    ));
    let job = session.start().unwrap().ai_job.unwrap();
    assert_eq!(session.status(), SessionStatus::AiThinking);
    assert_eq!(job.position.side_to_move(), PieceColor::White);

    assert_eq!(
        session.apply_user_move("e7", "e5").unwrap_err(),
        SessionError::AiThinking
    );
    session.apply_ai_result(job.ticket, compute(&job)).unwrap();
    assert_eq!(session.status(), SessionStatus::Active);
    assert_eq!(session.game().history().len(), 1);
}

#[test]
fn test_ai_delay_follows_difficulty() {
    let (mut session, _) = session_with(
        SessionConfig::new(PieceColor::Black, Difficulty::Hard, tc(5)),
        EngineConfig::default(),
    );
    let job = session.start().unwrap().ai_job.unwrap();
    assert_eq!(job.delay, Duration::from_millis(3 * 500));

    let (mut easy, _) = session_with(
        SessionConfig::new(PieceColor::Black, Difficulty::Easy, tc(5)),
        EngineConfig::default(),
    );
    let easy_job = easy.start().unwrap().ai_job.unwrap();
    assert_eq!(easy_job.delay, Duration::from_millis(500));
    assert_eq!(job.delay, easy_job.delay * 3);
}

#[test]
fn test_rejected_moves_change_nothing() {
    let (mut session, _) = session(SessionConfig::new(
        PieceColor::White,
        Difficulty::Easy,
        tc(5),
    ));
    assert_eq!(
        session.apply_user_move("e2", "e4").unwrap_err(),
        SessionError::NotStarted
    );
    session.start().unwrap();

    let before = session.snapshot();
    let err = session.apply_user_move("e2", "e5").unwrap_err();
    assert_eq!(
        err,
        SessionError::Move(MoveError::Illegal("e2e5".to_string()))
    );
    assert_eq!(session.snapshot(), before);

    // Black piece on White's turn.
    assert!(session.apply_user_move("e7", "e5").is_err());
    assert_eq!(session.snapshot(), before);
}

#[test]
fn test_resignation_records_once() {
    let (mut session, sink) = session(SessionConfig::new(
        PieceColor::White,
        Difficulty::Hard,
        tc(8),
    ));
    session.start().unwrap();
    let job = session.apply_user_move("d2", "d4").unwrap().unwrap();

    session.resign().unwrap();
    assert_eq!(session.status(), SessionStatus::Over);
    assert_eq!(session.result(), Some(GameResult::Defeat));
    assert_eq!(session.outcome(), Some(Outcome::Resignation));

    assert_eq!(session.resign().unwrap_err(), SessionError::GameOver);
    assert!(!session.abandon());
    // The search that was in flight no longer applies.
    assert_eq!(
        session
            .apply_ai_result(job.ticket, Err(EngineError::Aborted("late".into())))
            .unwrap_err(),
        SessionError::StaleAiResult
    );

    let history = sink.history().unwrap();
    assert_eq!(history.len(), 1);
    let record = &history[0];
    assert_eq!(record.color, PieceColor::White);
    assert_eq!(record.difficulty, Difficulty::Hard);
    assert_eq!(record.time_control_minutes, 8);
    assert_eq!(record.result, GameResult::Defeat);
    assert_eq!(record.outcome, Outcome::Resignation);
    assert_eq!(record.moves_text, "1. d4");
}

#[test]
fn test_draw_offer() {
    let sure = EngineConfig {
        draw_accept_probability: 1.0,
        ..EngineConfig::instant()
    };
    let never = EngineConfig {
        draw_accept_probability: 0.0,
        ..EngineConfig::instant()
    };
    let config = SessionConfig::new(PieceColor::White, Difficulty::Easy, tc(5));
    let mut rng = StdRng::seed_from_u64(5);

    let (mut declined, sink) = session_with(config.clone(), never);
    declined.start().unwrap();
    assert_eq!(declined.offer_draw(&mut rng), Ok(false));
    assert_eq!(declined.status(), SessionStatus::Active);
    assert!(sink.is_empty());

    let (mut accepted, sink) = session_with(config, sure);
    accepted.start().unwrap();
    assert_eq!(accepted.offer_draw(&mut rng), Ok(true));
    assert_eq!(accepted.result(), Some(GameResult::Draw));
    assert_eq!(accepted.outcome(), Some(Outcome::DrawAgreed));
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_draw_offer_acceptance_rate() {
    let config = SessionConfig::new(PieceColor::White, Difficulty::Easy, tc(5));
    let mut rng = StdRng::seed_from_u64(99);
    let mut accepted = 0;
    for _ in 0..400 {
        let (mut s, _) = session(config.clone());
        s.start().unwrap();
        if s.offer_draw(&mut rng).unwrap() {
            accepted += 1;
        }
    }
    assert!((150..250).contains(&accepted), "accepted {accepted} of 400");
}

#[test]
fn test_user_clock_runs_out() {
    let (mut session, sink) = session(SessionConfig::new(
        PieceColor::White,
        Difficulty::Easy,
        tc(3),
    ));
    session.start().unwrap();

    let mut outcome = TickOutcome::Idle;
    for n in 1..=181 {
        let tick = session.tick();
        if n < 180 {
            assert_eq!(tick, TickOutcome::Running(session.clock()));
        }
        if n == 180 {
            outcome = tick;
        }
        if n == 181 {
            assert_eq!(tick, TickOutcome::Idle);
        }
    }

    assert_eq!(
        outcome,
        TickOutcome::TimedOut {
            loser: PieceColor::White
        }
    );
    assert_eq!(session.clock(), GameClock { white: 0, black: 180 });
    assert_eq!(session.result(), Some(GameResult::Defeat));
    assert_eq!(session.outcome(), Some(Outcome::Timeout));
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_timeout_preempts_ai_result() {
    let (mut session, sink) = session(SessionConfig::new(
        PieceColor::Black,
        Difficulty::Easy,
        tc(3),
    ));
    let job = session.start().unwrap().ai_job.unwrap();

    for _ in 0..181 {
        session.tick();
    }
    // The computer's clock ran out while it was thinking.
    assert_eq!(session.result(), Some(GameResult::Victory));
    assert_eq!(session.outcome(), Some(Outcome::Timeout));

    assert_eq!(
        session.apply_ai_result(job.ticket, compute(&job)).unwrap_err(),
        SessionError::StaleAiResult
    );
    assert!(session.game().history().is_empty());
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_ticket_from_other_session_is_stale() {
    let config = SessionConfig::new(PieceColor::Black, Difficulty::Easy, tc(5));
    let (mut first, _) = session(config.clone());
    let (mut second, _) = session(config);
    let first_job = first.start().unwrap().ai_job.unwrap();
    let second_job = second.start().unwrap().ai_job.unwrap();
    assert_ne!(first_job.ticket, second_job.ticket);

    assert_eq!(
        second
            .apply_ai_result(first_job.ticket, compute(&first_job))
            .unwrap_err(),
        SessionError::StaleAiResult
    );
    assert_eq!(second.status(), SessionStatus::AiThinking);
    assert!(second
        .apply_ai_result(second_job.ticket, compute(&second_job))
        .is_ok());
}

#[test]
fn test_failed_ai_retries_then_forfeits() {
    let (mut session, sink) = session(SessionConfig::new(
        PieceColor::Black,
        Difficulty::Easy,
        tc(5),
    ));
    let first = session.start().unwrap().ai_job.unwrap();

    let retry = session
        .apply_ai_result(first.ticket, Err(EngineError::Aborted("panicked".into())))
        .unwrap()
        .unwrap();
    assert_ne!(retry.ticket, first.ticket);
    assert_eq!(session.status(), SessionStatus::AiThinking);
    assert_eq!(
        session
            .apply_ai_result(first.ticket, compute(&first))
            .unwrap_err(),
        SessionError::StaleAiResult
    );

    let done = session
        .apply_ai_result(retry.ticket, Err(EngineError::Aborted("panicked".into())))
        .unwrap();
    assert!(done.is_none());
    assert_eq!(session.result(), Some(GameResult::Victory));
    assert_eq!(session.outcome(), Some(Outcome::Forfeit));
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_illegal_ai_move_counts_as_failure() {
    let (mut session, _) = session(SessionConfig::new(
        PieceColor::Black,
        Difficulty::Easy,
        tc(5),
    ));
    let job = session.start().unwrap().ai_job.unwrap();
    // A black move offered while White is to move.
    let wrong = Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
        .unwrap()
        .find_move("e7", "e5")
        .unwrap();

    let retry = session.apply_ai_result(job.ticket, Ok(wrong)).unwrap();
    assert!(retry.is_some());
    assert!(session.game().history().is_empty());
}

#[test]
fn test_user_delivers_mate() {
    let config = SessionConfig::new(PieceColor::White, Difficulty::Impossible, tc(5))
        .with_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
    let (mut session, sink) = session(config);
    session.start().unwrap();

    assert!(session.apply_user_move("a1", "a8").unwrap().is_none());
    assert_eq!(session.result(), Some(GameResult::Victory));
    assert_eq!(session.outcome(), Some(Outcome::Checkmate));
    assert_eq!(sink.history().unwrap()[0].moves_text, "1. Ra8#");
}

#[test]
fn test_computer_delivers_mate() {
    let config = SessionConfig::new(PieceColor::White, Difficulty::Easy, tc(5))
        .with_fen("rnbqkbnr/pppp1ppp/8/4p3/8/5P2/PPPPP1PP/RNBQKBNR w KQkq - 0 2");
    let (mut session, _) = session(config);
    session.start().unwrap();

    let job = session.apply_user_move("g2", "g4").unwrap().unwrap();
    let mate = job.position.find_move("d8", "h4").unwrap();
    session.apply_ai_result(job.ticket, Ok(mate)).unwrap();

    assert_eq!(session.result(), Some(GameResult::Defeat));
    assert_eq!(session.outcome(), Some(Outcome::Checkmate));
    assert_eq!(session.snapshot().moves_text, "2. g4 Qh4#");
}

#[test]
fn test_abandonment() {
    let (mut session, sink) = session(SessionConfig::new(
        PieceColor::White,
        Difficulty::Easy,
        tc(5),
    ));
    assert!(!session.abandon());
    session.start().unwrap();
    assert!(session.abandon());
    assert_eq!(session.result(), Some(GameResult::Defeat));
    assert_eq!(session.outcome(), Some(Outcome::Abandonment));
    assert!(!session.abandon());
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_bad_fen_falls_back_to_start() {
    let config = SessionConfig::new(PieceColor::White, Difficulty::Easy, tc(5))
        .with_fen("not a fen");
    let (mut session, _) = session(config);
    let start = session.start().unwrap();

    assert!(matches!(start.fen_error, Some(LogicError::InvalidFen(_))));
    assert_eq!(session.status(), SessionStatus::Active);
    assert_eq!(session.snapshot().fen, Position::start().to_fen());
    assert_eq!(session.start().unwrap_err(), SessionError::AlreadyStarted);
}

#[test]
fn test_start_in_finished_position() {
    let config = SessionConfig::new(PieceColor::Black, Difficulty::Easy, tc(5))
        .with_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    let (mut session, sink) = session(config);
    let start = session.start().unwrap();
    assert!(start.ai_job.is_none());
    assert_eq!(session.result(), Some(GameResult::Draw));
    assert_eq!(session.outcome(), Some(Outcome::Stalemate));
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_snapshot_json() {
    let (mut session, _) = session(SessionConfig::new(
        PieceColor::White,
        Difficulty::Medium,
        tc(5),
    ));
    session.start().unwrap();
    session.apply_user_move("e2", "e4").unwrap();

    let json = serde_json::to_value(session.snapshot()).unwrap();
    assert_eq!(json["status"], "ai_thinking");
    assert_eq!(json["side_to_move"], "black");
    assert_eq!(json["difficulty"], "medium");
    assert_eq!(json["clock"]["white"], 300);
    assert_eq!(json["last_move"]["uci"], "e2e4");
    assert_eq!(json["last_move"]["san"], "e4");
    assert_eq!(json["moves_text"], "1. e4");
    assert!(json["result"].is_null());
}
