#![no_main]
use libfuzzer_sys::fuzz_target;

use std::time::Instant;
use weigher_core::frame::{FrameAssembler, FrameStep};
use weigher_core::{FrameCfg, extract_weight};

fuzz_target!(|data: &[u8]| {
    // Arbitrary byte streams must never panic the assembler or extractor,
    // and the line buffer must stay within its bound throughout.
    let now = Instant::now();
    let mut fa = FrameAssembler::new(&FrameCfg::default(), now);
    for &b in data {
        match fa.push_byte(b, now) {
            FrameStep::Record(line) => {
                let _ = extract_weight(&line);
            }
            FrameStep::Consumed | FrameStep::Overflow => {}
        }
        assert!(fa.buffered().len() <= 50);
    }
});
