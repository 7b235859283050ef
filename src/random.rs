use rand::Rng;

///Draws a row offset uniformly from `0..total`, or `None` when nothing matches.
///Sampling over the full count keeps every matching quote reachable.
pub fn uniform_offset<R: Rng + ?Sized>(rng: &mut R, total: i64) -> Option<i64> {
    if total <= 0 {
        return None;
    }
    Some(rng.gen_range(0..total))
}
