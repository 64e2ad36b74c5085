//! Stage transition encoding: `prev*10 + curr` on a change, `0` when
//! stable, `None` when either side is undefined.

pub fn detect_stage_transition(stage: &[Option<i32>]) -> Vec<Option<i32>> {
    let n = stage.len();
    let mut out = vec![None; n];
    for t in 0..n {
        out[t] = if t == 0 {
            stage[0].map(|_| 0)
        } else {
            match (stage[t - 1], stage[t]) {
                (Some(prev), Some(cur)) => Some(if prev != cur { prev * 10 + cur } else { 0 }),
                _ => None,
            }
        };
    }
    out
}
