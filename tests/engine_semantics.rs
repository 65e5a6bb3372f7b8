use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bf_engine::{Engine, EngineConfig, EngineError, ErrorKind, State, Strategy, TapePolicy};

const HELLO: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

fn run_captured(code: &str, config: EngineConfig, input: &[u8]) -> (Engine, Result<(), EngineError>, Vec<u8>) {
    let mut engine = Engine::with_config(code, config).expect("program should load");
    let out = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&out);
    engine.set_output_sink(move |bytes| sink.lock().unwrap().extend_from_slice(bytes));
    let mut queue: VecDeque<u8> = input.iter().copied().collect();
    engine.set_input_provider(move || queue.pop_front());
    let result = engine.run();
    let bytes = out.lock().unwrap().clone();
    (engine, result, bytes)
}

#[test]
fn hello_world_under_both_strategies() {
    for strategy in [Strategy::Stack, Strategy::Rescan] {
        let (engine, result, out) = run_captured(HELLO, EngineConfig::default().with_strategy(strategy), b"");
        assert!(result.is_ok());
        assert_eq!(out, b"Hello World!\n");
        assert_eq!(engine.state(), State::Halted);
    }
}

#[test]
fn add_cells_program_moves_value() {
    let (engine, result, _) = run_captured("++>+++<[->+<]", EngineConfig::default(), b"");
    assert!(result.is_ok());
    assert_eq!(&engine.tape().cells()[..2], &[0, 5]);
    assert_eq!(engine.pointer(), 0);
}

#[test]
fn runs_are_deterministic() {
    let code = ",[>+<-]>[<++>-]<.";
    let first = run_captured(code, EngineConfig::default(), &[21]).2;
    let second = run_captured(code, EngineConfig::default(), &[21]).2;
    assert_eq!(first, vec![42]);
    assert_eq!(first, second);
}

#[test]
fn cat_program_copies_input_until_eof() {
    let (_, result, out) = run_captured(",[.,]", EngineConfig::default(), b"bytes in, bytes out");
    assert!(result.is_ok());
    assert_eq!(out, b"bytes in, bytes out");
}

#[test]
fn growable_tape_reaches_far_cells() {
    let code = format!("{}+", ">".repeat(40_000));
    let cfg = EngineConfig::default().with_tape(TapePolicy::Growable);
    let (engine, result, _) = run_captured(&code, cfg, b"");
    assert!(result.is_ok());
    assert_eq!(engine.pointer(), 40_000);
    assert_eq!(engine.tape().cells()[40_000], 1);
}

#[test]
fn default_fixed_tape_stops_at_its_edge() {
    let code = ">".repeat(30_000);
    let (engine, result, _) = run_captured(&code, EngineConfig::default(), b"");
    assert!(matches!(result, Err(EngineError::BoundsViolation { ptr: 29_999, .. })));
    assert_eq!(engine.state(), State::Failed(ErrorKind::BoundsViolation));
}

#[test]
fn independent_engines_run_on_separate_threads() {
    let handles: Vec<_> = (1..=4u8)
        .map(|n| {
            std::thread::spawn(move || {
                let code = format!("{}.", "+".repeat(n as usize));
                run_captured(&code, EngineConfig::default(), b"").2
            })
        })
        .collect();
    let outputs: Vec<Vec<u8>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outputs, vec![vec![1], vec![2], vec![3], vec![4]]);
}
