use crate::data::bar::Bar;

//indices where the underlying contract changes (first bar of the new contract)
pub fn find_roll_points(bars: &[Bar]) -> Vec<usize> {
    bars.windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].symbol != pair[1].symbol)
        .map(|(i, _)| i + 1)
        .collect()
}

//back-adjusts a main continuous series across contract rolls
//at each roll the gap ratio between the new contract's first close and the
//old contract's last close is applied to every earlier bar; rolls are
//processed newest first so ratios compound through the history
pub fn adjust_rolls(bars: Vec<Bar>) -> Vec<Bar> {
    let mut bars = bars;
    let roll_points = find_roll_points(&bars);

    for &roll in roll_points.iter().rev() {
        let before_close = bars[roll - 1].close;
        let after_close = bars[roll].close;
        if before_close <= 0.0 {
            continue;
        }
        let ratio = after_close / before_close;

        for bar in &mut bars[..roll] {
            bar.open *= ratio;
            bar.high *= ratio;
            bar.low *= ratio;
            bar.close *= ratio;
        }
    }

    bars
}
