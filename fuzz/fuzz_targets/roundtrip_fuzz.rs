#![no_main]
use libfuzzer_sys::fuzz_target;
use oxips::engine;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Split into "original" and "modified" halves.
    let split = (data[0] as usize) % data.len();
    let (original, modified) = data.split_at(split);

    let patch = engine::create(original, modified).expect("create never fails");

    // Replay over the zero-extended original.
    let mut base = original.to_vec();
    if base.len() < modified.len() {
        base.resize(modified.len(), 0);
    }
    let output = engine::apply(&base, &[&patch]).expect("own patches always apply");
    assert_eq!(&output[..modified.len()], modified);
});
