#![no_main]
use libfuzzer_sys::fuzz_target;
use oxips::engine;

fuzz_target!(|data: &[u8]| {
    // Fuzz the parser with arbitrary bytes.
    // The parser must never panic — only return errors.
    let _ = engine::parse(data);

    // Also with a forced valid signature, to reach the record loop.
    let mut with_sig = b"PATCH".to_vec();
    with_sig.extend_from_slice(data);
    if let Ok(chunks) = engine::parse(&with_sig) {
        // Anything that parses must re-apply without panicking.
        let _ = engine::apply(&[], &[&with_sig]);
        let _ = chunks;
    }
});
