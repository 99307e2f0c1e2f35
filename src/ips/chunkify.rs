// Chunkifier: turns (source, target) buffer pairs into a minimal-cost
// ordered chunk list.
//
// Single forward scan over the target. Every mismatching byte is first
// treated as a potential run; two accumulators track the pending work as
// a run-record interpretation (`RunBlock`) and a literal-copy
// interpretation (`CopyBlock`), and the scan commits whichever is
// cheaper once the outcome is decided. A copy chunk may extend the last
// already-committed copy chunk instead of paying a fresh 5-byte header,
// so the copy accumulator reopens that chunk from an immutable snapshot
// and costs itself as a delta; its commit returns a `Splice` telling the
// scan loop whether to replace the list tail or just append.
//
// Reads past the end of `source` yield byte value 0: the chunk list is
// replayed over a zero-extended copy of the source, so target bytes that
// match the zero extension need no record.

use log::{debug, trace};

use super::chunk::{Chunk, EOF_OFFSET, MAX_CHUNK_LEN};

/// Matching-byte gap absorbed into a literal span rather than paying a
/// new record header (the header is 5 bytes; shorter gaps are cheaper to
/// re-copy than to split around).
const COPY_HEADER_SIZE: usize = 5;

#[inline]
fn source_byte(source: &[u8], i: usize) -> u8 {
    source.get(i).copied().unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Commit splice
// ---------------------------------------------------------------------------

/// How an accumulator's chunks join the finalized list.
#[derive(Debug)]
enum Splice {
    /// Append all chunks.
    Append(Vec<Chunk>),
    /// First chunk replaces the current list tail (a reopened copy
    /// chunk), the rest are appended.
    ReplaceLast(Vec<Chunk>),
}

fn apply_splice(chunks: &mut Vec<Chunk>, splice: Splice) {
    match splice {
        Splice::Append(pending) => chunks.extend(pending),
        Splice::ReplaceLast(pending) => {
            let mut pending = pending.into_iter();
            if let (Some(head), Some(tail)) = (pending.next(), chunks.last_mut()) {
                *tail = head;
            }
            chunks.extend(pending);
        }
    }
}

// ---------------------------------------------------------------------------
// Run-block accumulator
// ---------------------------------------------------------------------------

/// Accumulates run chunks. Cost is the absolute sum of wire sizes; runs
/// never merge with previously finalized chunks.
#[derive(Debug, Default)]
struct RunBlock {
    chunks: Vec<Chunk>,
}

impl RunBlock {
    fn size(&self) -> usize {
        self.chunks.iter().map(Chunk::wire_size).sum()
    }

    fn add(&mut self, start: u32, end: u32, value: u8) {
        self.chunks.push(Chunk::run(start, end, value));
    }

    fn commit(self) -> Splice {
        Splice::Append(self.chunks)
    }
}

// ---------------------------------------------------------------------------
// Copy-block accumulator
// ---------------------------------------------------------------------------

/// Accumulates literal-copy chunks, costed as the marginal bytes added
/// on top of the finalized list tail.
///
/// If the last finalized chunk is itself a copy chunk it is reopened
/// here (by value, from a snapshot) so that extending it costs only the
/// extra literal bytes, not a new header.
#[derive(Debug)]
struct CopyBlock {
    chunks: Vec<Chunk>,
    reopened: bool,
    base_size: usize,
}

impl CopyBlock {
    fn new(tail: Option<Chunk>) -> Self {
        match tail {
            Some(chunk) if chunk.run.is_none() => Self {
                base_size: chunk.wire_size(),
                chunks: vec![chunk],
                reopened: true,
            },
            _ => Self {
                chunks: Vec::new(),
                reopened: false,
                base_size: 0,
            },
        }
    }

    /// Marginal wire cost of committing the accumulated chunks.
    fn size(&self) -> usize {
        let total: usize = self.chunks.iter().map(Chunk::wire_size).sum();
        total - self.base_size
    }

    /// Open a new chunk at `start`. A start equal to the reserved EOF
    /// offset is shifted back one byte so the emitted record offset can
    /// never collide with the terminator.
    fn open(&mut self, start: u32, end: u32) {
        let safe_start = if start == EOF_OFFSET { start - 1 } else { start };
        self.chunks.push(Chunk::copy(safe_start, end));
    }

    fn add(&mut self, start: u32, end: u32) {
        if self.chunks.is_empty() {
            self.open(start, start);
        }

        let cur = *self.chunks.last().expect("chunk opened above");
        let wide_gap = start > cur.end + COPY_HEADER_SIZE as u32;
        let overflow_inside_gap = start - cur.start > MAX_CHUNK_LEN;
        if wide_gap || overflow_inside_gap {
            self.open(start, start);
        }

        self.chunks.last_mut().expect("chunk opened above").end = end;

        // Split at the 16-bit length limit, chaining continuation chunks
        // until the remainder fits.
        loop {
            let cur = self.chunks.last_mut().expect("chunk opened above");
            if cur.len() <= MAX_CHUNK_LEN {
                break;
            }
            let split = cur.start + MAX_CHUNK_LEN;
            let tail = cur.end;
            cur.end = split;
            self.open(split, tail);
        }
    }

    fn commit(self) -> Splice {
        if self.reopened {
            Splice::ReplaceLast(self.chunks)
        } else {
            Splice::Append(self.chunks)
        }
    }
}

// ---------------------------------------------------------------------------
// Forward scan
// ---------------------------------------------------------------------------

/// Compute the chunk list whose replay over a zero-extended copy of
/// `source` reproduces `target`.
pub fn chunkify(source: &[u8], target: &[u8]) -> Vec<Chunk> {
    let len = target.len();
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut offset = 0usize;

    let mut run_block = RunBlock::default();
    let mut copy_block = CopyBlock::new(None);

    loop {
        // Skip phase: advance past bytes already correct in the target.
        let scan_start = offset;
        while offset < len && target[offset] == source_byte(source, offset) {
            offset += 1;
        }

        // Commit decision. A non-positive relative cost means extending
        // the copy side is free or better, and left-side copy keeps more
        // options open. Once the copy side can no longer win even after
        // absorbing the gap, the pending work must be a run.
        let gap = offset - scan_start;
        let end_of_block = gap > COPY_HEADER_SIZE || offset == len;
        let relative_cost = copy_block.size() as i64 - run_block.size() as i64;

        let commit_copy = relative_cost <= 0;
        let commit_run =
            !commit_copy && (relative_cost + gap as i64 > COPY_HEADER_SIZE as i64 || end_of_block);

        if commit_copy || commit_run {
            let pending_copy = std::mem::replace(&mut copy_block, CopyBlock::new(None));
            let pending_run = std::mem::take(&mut run_block);
            let splice = if commit_copy {
                trace!("commit copy block at offset {offset} (cost {relative_cost})");
                pending_copy.commit()
            } else {
                trace!("commit run block at offset {offset} (cost {relative_cost}, gap {gap})");
                pending_run.commit()
            };
            apply_splice(&mut chunks, splice);
            copy_block = CopyBlock::new(chunks.last().copied());
        }

        if offset >= len {
            break;
        }

        // Diff-byte phase: treat the mismatching byte as a run candidate.
        let run_value = target[offset];
        let mut i = offset;
        let mut diff_start = Some(offset);
        let mut gap_start: Option<usize> = None;

        if offset == EOF_OFFSET as usize {
            // A run starting at the reserved offset would decode as the
            // terminator; fall back to single-byte literal handling.
            i += 1;
        } else {
            // Greedy run extension, capped at the 16-bit length limit.
            // Bytes that already match the source are tracked as a gap:
            // a short gap is absorbed if mismatches resume, a sustained
            // one ends the run early.
            while i - offset < MAX_CHUNK_LEN as usize {
                i += 1;
                if target.get(i) != Some(&run_value) {
                    break;
                }
                if run_value != source_byte(source, i) {
                    if diff_start.is_none() {
                        diff_start = Some(i);
                        gap_start = None;
                    }
                } else if let Some(start) = diff_start.take() {
                    copy_block.add(start as u32, i as u32);
                    gap_start = Some(i);
                }
            }
        }

        let run_end = gap_start.unwrap_or(i);
        run_block.add(offset as u32, run_end as u32, run_value);

        // No sustained gap: register the same span as copy-candidate
        // material so the next decision can weigh it as literal bytes.
        if gap_start.is_none()
            && let Some(start) = diff_start
        {
            copy_block.add(start as u32, run_end as u32);
        }

        offset = run_end;
    }

    debug!(
        "chunkify: {} chunks for {} target bytes ({} source bytes)",
        chunks.len(),
        target.len(),
        source.len()
    );
    chunks
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Chunkify against an empty source: every target byte differs
    /// (unless it is 0, which matches the zero extension).
    fn split(target: &[u8]) -> Vec<Chunk> {
        chunkify(b"", target)
    }

    fn copy(start: u32, end: u32) -> Chunk {
        Chunk::copy(start, end)
    }

    fn run(start: u32, end: u32, value: u8) -> Chunk {
        Chunk::run(start, end, value)
    }

    #[test]
    fn ignores_short_run() {
        // length <= 3 never pays for the fixed 8-byte run record
        assert_eq!(split(b"AzzzD"), [copy(0, 5)]);
    }

    #[test]
    fn identifies_minimum_run() {
        assert_eq!(split(b"zzzz"), [run(0, 4, b'z')]);
    }

    #[test]
    fn omits_short_run_between_copies() {
        assert_eq!(split(b"AggggB"), [copy(0, 6)]);
    }

    #[test]
    fn omits_short_run_before_copy() {
        assert_eq!(split(b"ggggB"), [copy(0, 5)]);
    }

    #[test]
    fn omits_short_run_after_copy() {
        assert_eq!(split(b"Bgggg"), [copy(0, 5)]);
    }

    #[test]
    fn omits_short_run_pair_between_copies() {
        assert_eq!(split(b"AggggzzzzB"), [copy(0, 10)]);
    }

    #[test]
    fn omits_short_run_pair_before_copy() {
        assert_eq!(split(b"ggggzzzzB"), [copy(0, 9)]);
    }

    #[test]
    fn omits_short_run_pair_after_copy() {
        assert_eq!(split(b"Aggggzzzz"), [copy(0, 9)]);
    }

    #[test]
    fn omits_short_run_between_copy_and_run() {
        assert_eq!(
            split(b"Aggggggggzzzzzzzzz"),
            [copy(0, 9), run(9, 18, b'z')]
        );
    }

    #[test]
    fn omits_short_run_between_run_and_copy() {
        assert_eq!(
            split(b"zzzzzzzzzggggggggA"),
            [run(0, 9, b'z'), copy(9, 18)]
        );
    }

    #[test]
    fn keeps_long_run_between_copies() {
        assert_eq!(
            split(b"AggggggggggggggB"),
            [copy(0, 1), run(1, 15, b'g'), copy(15, 16)]
        );
    }

    #[test]
    fn keeps_long_run_before_copy() {
        assert_eq!(split(b"gggggggggB"), [run(0, 9, b'g'), copy(9, 10)]);
    }

    #[test]
    fn keeps_long_run_after_copy() {
        assert_eq!(split(b"Bggggggggg"), [copy(0, 1), run(1, 10, b'g')]);
    }

    #[test]
    fn keeps_long_run_pair_between_copies() {
        assert_eq!(
            split(b"AgggggggggzzzzzzzzzzzzzB"),
            [copy(0, 1), run(1, 10, b'g'), run(10, 23, b'z'), copy(23, 24)]
        );
    }

    #[test]
    fn keeps_long_run_pair_before_copy() {
        assert_eq!(
            split(b"ggggzzzzzzzzzzzzzB"),
            [run(0, 4, b'g'), run(4, 17, b'z'), copy(17, 18)]
        );
    }

    #[test]
    fn keeps_long_run_pair_after_copy() {
        assert_eq!(
            split(b"Azzzzzzzzzzzzzgggg"),
            [copy(0, 1), run(1, 14, b'z'), run(14, 18, b'g')]
        );
    }

    #[test]
    fn splits_run_length_overflow() {
        let target = vec![b'z'; 0x20000];
        assert_eq!(
            split(&target),
            [
                run(0, 0xFFFF, b'z'),
                run(0xFFFF, 0x1FFFE, b'z'),
                // final 2 bytes are cheaper as a literal copy
                copy(0x1FFFE, 0x20000),
            ]
        );
    }

    #[test]
    fn splits_copy_length_overflow() {
        // Non-repeating, never 0, so no runs and no zero-extension match.
        let target: Vec<u8> = (0..0x20000usize).map(|i| (i % 255) as u8 + 1).collect();
        assert_eq!(
            split(&target),
            [
                copy(0, 0xFFFF),
                copy(0xFFFF, 0x1FFFE),
                copy(0x1FFFE, 0x20000),
            ]
        );
    }

    #[test]
    fn shifts_diff_at_reserved_offset() {
        let original = vec![0u8; EOF_OFFSET as usize + 1];
        let mut modified = original.clone();
        modified[EOF_OFFSET as usize] = 1;

        // The lone diff lands exactly on the reserved offset and is
        // widened one byte to the left as a literal copy.
        assert_eq!(
            chunkify(&original, &modified),
            [copy(EOF_OFFSET - 1, modified.len() as u32)]
        );
    }

    #[test]
    fn skips_bytes_matching_zero_extension() {
        // Target bytes beyond the source that are 0 match the
        // zero-extended replay buffer and need no record.
        assert_eq!(chunkify(b"ab", b"ab\0\0\0\0"), []);
    }

    #[test]
    fn absorbs_short_matching_gap_into_copy() {
        // 'cc' matches the source mid-diff; a 2-byte gap is cheaper to
        // re-copy than a second record header.
        assert_eq!(chunkify(b"xxccxx", b"yyccyy"), [copy(0, 6)]);
    }

    #[test]
    fn sustained_matching_span_splits_records() {
        let source = b"xx--------xx";
        let target = b"yy--------yy";
        assert_eq!(chunkify(source, target), [copy(0, 2), copy(10, 12)]);
    }

    #[test]
    fn identical_buffers_need_no_chunks() {
        assert_eq!(chunkify(b"same bytes", b"same bytes"), []);
    }
}
