//! Quasi-retrieved backscatter, particle depolarization ratio and Angstrom
//! exponent as time-height images.

use super::{date_footer, mesh_time_axis, site, time_height, version_footer};
use crate::color::Colormap;
use crate::data::mask::mask_flagged;
use crate::data::schema::{Grid, RecordHeader};
use crate::data::{ResultRecord, SchemaError};
use crate::render::ticks::{linspace, multiples};
use crate::render::{AxesRect, Axis, Colorbar, Figure, FigureBody, MeshPanel, Ticks};

const BSC_WAVELENGTHS: [u32; 3] = [355, 532, 1064];

/// Backscatter is stored in m⁻¹sr⁻¹ and shown in Mm⁻¹sr⁻¹.
const TO_PER_MEGAMETER: f64 = 1e6;

/// Colorbar rect for the backscatter images; the ratio images sit closer.
const BSC_COLORBAR: AxesRect = AxesRect::new(0.94, 0.20, 0.02, 0.65);
const RATIO_COLORBAR: AxesRect = AxesRect::new(0.92, 0.20, 0.02, 0.65);

/// One image of the family before the shared layout is applied.
struct Product {
    tag: String,
    title: String,
    values: Grid,
    limits: (f64, f64),
    colorbar_rect: AxesRect,
    colorbar_ticks: Vec<f64>,
    colorbar_title: &'static str,
}

pub fn figures(record: &ResultRecord, header: &RecordHeader) -> Result<Vec<Figure>, SchemaError> {
    let (time, height) = time_height(record)?;
    let shape = (height.len(), time.len());
    let grid = |name: &str| record.grid(name, shape.0, shape.1);
    let y_range = record.limits("yLim_Quasi_Params")?;
    let site = site(header);

    let mask_532 = grid("quality_mask_532")?;
    let mask_1064 = grid("quality_mask_1064")?;

    let mut products = Vec::new();
    for wavelength in BSC_WAVELENGTHS {
        let mask = match wavelength {
            532 => mask_532.clone(),
            1064 => mask_1064.clone(),
            _ => grid(&format!("quality_mask_{wavelength}"))?,
        };
        let bsc = grid(&format!("quasi_bsc_{wavelength}"))?.map(|v| v * TO_PER_MEGAMETER);
        let limits = record.limits(&format!("quasi_beta_cRange_{wavelength}"))?;
        products.push(Product {
            tag: format!("Quasi_Bsc_{wavelength}"),
            title: format!("Quasi backscatter coefficient at {wavelength}nm from {site}"),
            values: mask_flagged(&bsc, &[&mask]),
            limits,
            colorbar_rect: BSC_COLORBAR,
            colorbar_ticks: linspace(limits.0, limits.1, 5),
            colorbar_title: "Mm⁻¹*sr⁻¹",
        });
    }

    products.push(Product {
        tag: "Quasi_PDR_532".to_string(),
        title: format!("Quasi particle depolarization ratio at 532nm from {site}"),
        values: mask_flagged(&grid("quasi_pardepol_532")?, &[&mask_532]),
        limits: record.limits("quasi_Par_DR_cRange_532")?,
        colorbar_rect: RATIO_COLORBAR,
        colorbar_ticks: multiples(0.05, 0.0, 0.4),
        colorbar_title: "",
    });

    products.push(Product {
        tag: "Quasi_ANGEXP_532_1064".to_string(),
        title: format!("Quasi BSC Angstoem Exponent 532-1064 from {site}"),
        values: mask_flagged(&grid("quasi_ang_532_1064")?, &[&mask_532, &mask_1064]),
        limits: (0.0, 2.0),
        colorbar_rect: RATIO_COLORBAR,
        colorbar_ticks: multiples(0.5, 0.0, 2.0),
        colorbar_title: "",
    });

    let x = mesh_time_axis(record, &time)?;
    let y = Axis::linear(
        "Height (m)",
        y_range,
        Ticks::Multiple {
            major: 2000.0,
            minor: Some(500.0),
        },
    );
    let day = time[0];

    products
        .into_iter()
        .map(|product| {
            Ok(Figure {
                tag: product.tag,
                size: (10.0, 5.0),
                title: Some(product.title),
                title_size: 15.0,
                body: FigureBody::Mesh(MeshPanel {
                    rect: AxesRect::new(0.11, 0.15, 0.79, 0.75),
                    x: x.clone(),
                    y: y.clone(),
                    x_centers: time.clone(),
                    y_centers: height.clone(),
                    values: product.values,
                    limits: product.limits,
                    colormap: Colormap::jet(),
                    colorbar: Colorbar {
                        rect: product.colorbar_rect,
                        ticks: product.colorbar_ticks,
                        labels: None,
                        title: product.colorbar_title.to_string(),
                        label_size: 15.0,
                    },
                }),
                texts: vec![
                    date_footer(day, (0.05, 0.02), 12.0)?,
                    version_footer(header, (0.8, 0.02), 12.0),
                ],
                watermark: false,
            })
        })
        .collect()
}
