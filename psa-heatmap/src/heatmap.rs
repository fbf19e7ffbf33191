use anyhow::Result;
use colorgrad::Gradient;
use nalgebra::DMatrix;
use plotters::{
    prelude::*,
    style::{FontTransform, BLACK},
};

fn filled_style<C: Into<RGBAColor>>(color: C) -> ShapeStyle {
    ShapeStyle {
        color: color.into(),
        filled: true,
        stroke_width: 0,
    }
}

pub struct Colorbar<T: Gradient> {
    min: f64,
    max: f64,
    gradient: T,
}

impl<T: Gradient> Colorbar<T> {
    pub fn new(min: f64, max: f64, gradient: T) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
            gradient,
        }
    }

    pub fn color(&self, value: f64) -> RGBColor {
        let value = self.min.max(value).min(self.max);
        let span = self.max - self.min;
        let scaled = if span.is_normal() {
            (value - self.min) / span
        } else {
            0.5
        };
        let rgba = self.gradient.at(scaled as f32).to_rgba8();
        RGBColor(rgba[0], rgba[1], rgba[2])
    }

    pub fn draw<DB: DrawingBackend>(&self, mut chart_builder: ChartBuilder<DB>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let &Self { min, max, .. } = self;
        let steps = 256;
        let step = (max - min) / steps as f64;
        let mut chart_context = chart_builder
            .margin_top(10)
            .margin_right(15)
            .x_label_area_size(25)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..1.0, min..max.max(min + f64::EPSILON))?;
        chart_context
            .configure_mesh()
            .set_all_tick_mark_size(5)
            .disable_x_axis()
            .disable_x_mesh()
            .disable_y_mesh()
            .axis_style(BLACK)
            .label_style(("sans-serif", 16).into_font().color(&BLACK))
            .draw()?;
        let plotting_area = chart_context.plotting_area();
        for value in (0..steps).map(|i| min + i as f64 * step) {
            let rectangle = Rectangle::new(
                [(0.0, value), (1.0, value + step)],
                filled_style(self.color(value)),
            );
            plotting_area.draw(&rectangle)?;
        }
        Ok(())
    }
}

/// Square distance matrix as colored cells, row 0 at the top.
pub fn heatmap<DB: DrawingBackend, T: Gradient>(
    data: &DMatrix<f64>,
    labels: &[&str],
    colorbar: &Colorbar<T>,
    mut chart_builder: ChartBuilder<DB>,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let n = data.nrows() as i32;
    assert!(n > 0 && data.is_square());

    let mut chart_context = chart_builder
        .margin_top(10)
        .x_label_area_size(90)
        .y_label_area_size(90)
        .build_cartesian_2d(0..n, n..0)?;

    let (width, height) = chart_context.plotting_area().dim_in_pixel();
    let label = |i: &i32| {
        labels
            .get(*i as usize)
            .map(|s| s.to_string())
            .unwrap_or_default()
    };
    chart_context
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .set_all_tick_mark_size(3)
        .x_labels(n as usize)
        .y_labels(n as usize)
        .x_label_offset((width / n as u32 / 2) as i32)
        .y_label_offset((height / n as u32 / 2) as i32)
        .x_label_formatter(&label)
        .y_label_formatter(&label)
        .axis_style(BLACK)
        .x_label_style(
            ("sans-serif", 12)
                .into_font()
                .transform(FontTransform::Rotate90)
                .color(&BLACK),
        )
        .y_label_style(("sans-serif", 12).into_font().color(&BLACK))
        .draw()?;

    let plotting_area = chart_context.plotting_area();
    for (row, col) in (0..n).flat_map(|row| (0..n).map(move |col| (row, col))) {
        let value = data[(row as usize, col as usize)];
        let rectangle = Rectangle::new(
            [(col, row), (col + 1, row + 1)],
            filled_style(colorbar.color(value)),
        );
        plotting_area.draw(&rectangle)?;
    }
    Ok(())
}
