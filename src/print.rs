use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};

use crate::kelly::KellyAdvice;
use crate::pool::Pool;

#[derive(Debug)]
pub struct RunnerValue {
    pub runner: String,
    pub pool_share: f64,
    pub place_prob: f64,
    pub expected: f64,
    pub conditional: f64,
    pub advice: Option<KellyAdvice>,
}

pub fn tabulate_values(rows: &[RunnerValue]) -> Table {
    let mut table = Table::default()
        .with_cols({
            let mut cols = vec![Col::new(
                Styles::default().with(MinWidth(18)).with(HAlign::Left),
            )];
            for _ in 0..6 {
                cols.push(Col::new(
                    Styles::default().with(MinWidth(10)).with(HAlign::Right),
                ));
            }
            cols
        })
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            vec![
                "Runner".into(),
                "Pool share".into(),
                "Place prob".into(),
                "EV".into(),
                "EV placed".into(),
                "Kelly frac".into(),
                "Bet EV".into(),
            ],
        ));
    for row in rows {
        let (fraction, bet_value) = match &row.advice {
            Some(advice) => (
                format!("{:.4}", advice.fraction),
                format!("{:.4}", advice.expected_value),
            ),
            None => ("-".into(), "-".into()),
        };
        table.push_row(Row::new(
            Styles::default(),
            vec![
                row.runner.clone().into(),
                format!("{:.3}", row.pool_share).into(),
                format!("{:.4}", row.place_prob).into(),
                format!("{:+.4}", row.expected).into(),
                format!("{:+.4}", row.conditional).into(),
                fraction.into(),
                bet_value.into(),
            ],
        ));
    }
    table
}

pub fn tabulate_pools(win: &Pool, show: &Pool) -> Table {
    let shares = win.relative();
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(18)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            vec![
                "Runner".into(),
                "Win money".into(),
                "Show money".into(),
                "Win share".into(),
            ],
        ));
    for runner in win.runners() {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                runner.clone().into(),
                format!("{:.0}", win.weight_of(runner).unwrap_or(0.0)).into(),
                format!("{:.0}", show.weight_of(runner).unwrap_or(0.0)).into(),
                format!("{:.3}", shares[runner]).into(),
            ],
        ));
    }
    table
}
