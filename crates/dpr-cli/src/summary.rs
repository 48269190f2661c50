use console::Style;
use dpr_core::consts::DEFAULT_BACKGROUND_PER_PSF;
use dpr_core::pipeline::config::{DenoiseConfig, PipelineConfig};
use dpr_core::pipeline::PipelineOutput;
use dpr_core::stack::TemporalOutput;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_pipeline_summary(config: &PipelineConfig, engine_name: &str) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("DPR Reconstruction"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(18)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Engine"),
        s.method.apply_to(engine_name)
    );
    println!();

    println!("  {}", s.header.apply_to("Parameters"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("PSF"),
        s.value.apply_to(format!("{} px", config.psf))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Gain"),
        s.value.apply_to(config.gain)
    );
    match config.background {
        Some(bg) => println!(
            "    {:<12}{}",
            s.label.apply_to("Background"),
            s.value.apply_to(format!("{bg} px"))
        ),
        None => {
            let auto = (DEFAULT_BACKGROUND_PER_PSF * config.psf).ceil();
            println!(
                "    {:<12}{}",
                s.label.apply_to("Background"),
                s.disabled.apply_to(format!("auto ({auto} px)"))
            )
        }
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Temporal"),
        s.method.apply_to(config.temporal)
    );
    println!();

    println!("  {}", s.header.apply_to("Processing"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Raw interp"),
        s.method.apply_to(config.raw_interpolation)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Outliers"),
        s.method.apply_to(config.displacement_policy)
    );
    match &config.denoise {
        Some(DenoiseConfig::Gaussian { sigma }) => println!(
            "    {:<12}{}",
            s.label.apply_to("Denoise"),
            s.value.apply_to(format!("Gaussian, sigma {sigma}"))
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Denoise"),
            s.disabled.apply_to("disabled")
        ),
    }
    println!();
}

pub fn print_result_summary(output: &PipelineOutput) {
    let s = Styles::new();
    let (rows, cols) = output.input_shape;
    let (out_rows, out_cols) = output.result.output_shape();

    println!();
    println!("  {}", s.header.apply_to("Result"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(output.frame_count)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Geometry"),
        s.value.apply_to(format!("{cols}x{rows} -> {out_cols}x{out_rows}"))
    );
    let kind = match &output.result.output {
        TemporalOutput::Reduced(_) => {
            format!("{} of {} frames", output.result.temporal, output.frame_count)
        }
        TemporalOutput::Stack(frames) => format!("{} frames", frames.len()),
    };
    println!(
        "    {:<12}{}",
        s.label.apply_to("Output"),
        s.value.apply_to(kind)
    );
}
