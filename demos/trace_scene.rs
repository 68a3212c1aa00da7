use reelflow::{
    Color, CueTimeline, Ease, Node, Scheduler, SchedulerConfig, Vec2, all, sequence, stagger,
    wait_for, wait_until,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cues = CueTimeline::from_json(include_str!("../tests/data/cues.json"))?;

    let card = Node::new("rect")
        .with_key("card")
        .with_prop("opacity", 0.0)
        .with_prop("position", Vec2::new(-200.0, 0.0))
        .with_prop("fill", Color::parse("#68ABDF")?);
    let copy = card.deep_clone()?.with_key("copy");

    let script = sequence([
        wait_until("initSound"),
        stagger(
            0.2,
            [
                card.animate("opacity", 1.0, 0.6, Ease::OutCubic)?,
                card.animate("position", Vec2::new(200.0, 0.0), 0.8, Ease::InOutCubic)?,
                copy.animate("opacity", 0.5, 0.6, Ease::Linear)?,
            ],
        )?,
        wait_until("validateStart"),
        all([
            card.animate("fill", Color::parse("gold")?, 1.0, Ease::InOutSine)?,
            wait_for(0.5)?,
        ]),
    ]);

    let cfg = SchedulerConfig::at_fps(30, 1)?;
    let mut scheduler = Scheduler::new(script, cfg)?.with_cues(cues);
    scheduler.watch(card.signal::<f64>("opacity")?);
    scheduler.watch(card.signal::<Vec2>("position")?);
    scheduler.watch(copy.signal::<f64>("opacity")?);

    let report = scheduler.run()?;
    if let Some(trace) = &report.trace {
        for sample in trace.frames.iter().step_by(15) {
            println!("frame {:>3} t={:.3}s {:?}", sample.frame.0, sample.time, sample.values);
        }
        let fp = trace.fingerprint()?;
        println!("fingerprint {:016x}{:016x}", fp.hi, fp.lo);
    }
    println!(
        "{:?} after {} frames ({:.3}s)",
        report.end, report.frames, report.duration_secs
    );
    for d in &report.diagnostics {
        println!("{d}");
    }
    Ok(())
}
