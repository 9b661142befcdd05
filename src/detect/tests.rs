use assert_approx_eq::assert_approx_eq;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{
    Rng,
    SeedableRng,
};
use rand_distr::{
    Distribution,
    LogNormal,
};
use rstest::{
    fixture,
    rstest,
};

use super::*;
use crate::data_structs::{
    Channel,
    Manifest,
    RawIntensities,
    SampleContainer,
    DETECTION_PVALUE_COL,
};
use crate::dataset::MethylationDataset;
use crate::error::IllumethError;
use crate::utils::{
    float_column,
    string_column,
};

fn manifest_with_key(probe_key: &str) -> Manifest {
    let df = df!(
        probe_key => ["cg01", "cg02", "cg03", "cg04"],
        "Infinium_Design_Type" => ["II", "I", "I", "II"],
        "Color_Channel" => [None, Some("Grn"), Some("Red"), None],
        "AddressA_ID" => [1001u32, 1002, 1003, 1004],
        "AddressB_ID" => [None, Some(2002u32), Some(2003), None],
    )
    .unwrap();
    Manifest::try_new(df, probe_key).unwrap()
}

#[fixture]
fn manifest() -> Manifest {
    manifest_with_key("IlmnID")
}

#[fixture]
fn oob_green() -> DataFrame {
    df!("mean_value" => [1.0, 2.0, 3.0, 4.0, 5.0]).unwrap()
}

#[fixture]
fn oob_red() -> DataFrame {
    df!("mean_value" => [10.0, 20.0, 30.0, 40.0, 50.0]).unwrap()
}

fn container(
    sample_id: &str,
    meth: [f64; 4],
    unmeth: [f64; 4],
) -> SampleContainer {
    let data = df!(
        "IlmnID" => ["cg01", "cg02", "cg03", "cg04"],
        "meth" => meth,
        "unmeth" => unmeth,
    )
    .unwrap();
    SampleContainer::try_new(sample_id, "IlmnID", data).unwrap()
}

/// Intensities placed on the out-of-band step points: every probe lands on
/// p = 0.4 except cg04, whose methylated signal saturates the Green
/// background.
#[fixture]
fn sesame_container(
    oob_green: DataFrame,
    oob_red: DataFrame,
) -> SampleContainer {
    container("s1", [3.0, 3.0, 30.0, 5.0], [20.0, 2.0, 20.0, 10.0])
        .with_oob(Channel::Green, oob_green)
        .with_oob(Channel::Red, oob_red)
}

#[fixture]
fn ctrl_red() -> DataFrame {
    df!(
        "Extended_Type" => ["neg1", "neg2", "neg3", "neg4", "neg5", "stain1"],
        "Control_Type" => ["NEGATIVE", "NEGATIVE", "NEGATIVE", "NEGATIVE", "NEGATIVE", "STAINING"],
        "mean_value" => [90.0, 95.0, 100.0, 105.0, 110.0, 5000.0],
    )
    .unwrap()
}

#[fixture]
fn ctrl_green() -> DataFrame {
    df!(
        "Extended_Type" => ["neg1", "neg2", "neg3", "neg4", "neg5", "stain1"],
        "Control_Type" => ["NEGATIVE", "NEGATIVE", "NEGATIVE", "NEGATIVE", "NEGATIVE", "STAINING"],
        "mean_value" => [45.0, 50.0, 55.0, 60.0, 65.0, 6000.0],
    )
    .unwrap()
}

/// mu_R = 100, mu_G = 55; every probe's meth+unmeth sits exactly on its
/// class mean except cg04, which is far above background.
#[fixture]
fn minfi_container(
    ctrl_red: DataFrame,
    ctrl_green: DataFrame,
) -> SampleContainer {
    container("s1", [80.0, 55.0, 100.0, 2000.0], [75.0, 55.0, 100.0, 2000.0])
        .with_controls(Channel::Red, ctrl_red)
        .with_controls(Channel::Green, ctrl_green)
}

#[rstest]
fn empirical_boundary_values(
    sesame_container: SampleContainer,
    manifest: Manifest,
) -> anyhow::Result<()> {
    let result = pval_empirical(&[sesame_container], &manifest)?;

    assert_eq!(
        string_column(&result, "IlmnID")?,
        vec!["cg01", "cg02", "cg03", "cg04"]
    );
    let pvalues = float_column(&result, "s1")?;
    // cg02 (IG): funcG(3) = 0.6, funcG(2) = 0.4 -> 1 - 0.6.
    assert_approx_eq!(pvalues[1], 0.4);
    // cg03 (IR): funcR(30) = 0.6, funcR(20) = 0.4 -> 1 - 0.6.
    assert_approx_eq!(pvalues[2], 0.4);
    // cg01 (II): meth against Green, unmeth against Red.
    assert_approx_eq!(pvalues[0], 0.4);
    // cg04 (II): funcG(5) = 1.0; scoring meth against Red instead would
    // give 0.8.
    assert_approx_eq!(pvalues[3], 0.0);
    Ok(())
}

#[rstest]
fn parametric_boundary_values(
    minfi_container: SampleContainer,
    manifest: Manifest,
) -> anyhow::Result<()> {
    let result = pval_parametric(&[minfi_container], &manifest)?;

    let pvalues = float_column(&result, "s1")?;
    // cg03 (IR): meth+unmeth = 200 = 2*mu_R -> exactly half the mass.
    assert_approx_eq!(pvalues[2], 0.5);
    // cg02 (IG): 110 = 2*mu_G. Only holds if the STAINING rows were
    // filtered out of the controls.
    assert_approx_eq!(pvalues[1], 0.5);
    // cg01 (II): 155 = mu_R + mu_G.
    assert_approx_eq!(pvalues[0], 0.5);
    // cg04 (II): far above background.
    assert!(pvalues[3] < 1e-9);
    Ok(())
}

#[rstest]
fn parametric_needs_two_negative_controls(
    ctrl_green: DataFrame,
    manifest: Manifest,
) -> anyhow::Result<()> {
    let one_negative = df!(
        "Extended_Type" => ["neg1"],
        "Control_Type" => ["NEGATIVE"],
        "mean_value" => [100.0],
    )?;
    let sample = container("s1", [1.0; 4], [1.0; 4])
        .with_controls(Channel::Red, one_negative)
        .with_controls(Channel::Green, ctrl_green);

    let err = pval_parametric(&[sample], &manifest).unwrap_err();
    assert!(matches!(
        err,
        IllumethError::InsufficientControls {
            channel: Channel::Red,
            found: 1,
        }
    ));
    Ok(())
}

#[rstest]
fn dispatch_requires_uncorrected_data(manifest: Manifest) {
    let data = df!(
        "IlmnID" => ["cg01"],
        "meth" => [1.0],
    )
    .unwrap();
    let sample = SampleContainer::try_new("s1", "IlmnID", data).unwrap();

    let err =
        detect_probes(&[sample], &manifest, DetectionMethod::default()).unwrap_err();
    assert!(matches!(err, IllumethError::MissingUncorrectedData(_)));
}

#[rstest]
fn dispatch_rejects_duplicate_sample_ids(
    sesame_container: SampleContainer,
    manifest: Manifest,
) {
    let twin = sesame_container.clone();
    let err = detect_probes(
        &[sesame_container, twin],
        &manifest,
        DetectionMethod::Empirical,
    )
    .unwrap_err();
    assert!(matches!(err, IllumethError::Validation(_)));
}

#[rstest]
fn multi_sample_output_is_one_column_per_sample(
    oob_green: DataFrame,
    oob_red: DataFrame,
    manifest: Manifest,
) -> anyhow::Result<()> {
    let s1 = container("s1", [3.0, 3.0, 30.0, 5.0], [20.0, 2.0, 20.0, 10.0])
        .with_oob(Channel::Green, oob_green.clone())
        .with_oob(Channel::Red, oob_red.clone());
    let s2 = container("s2", [3.0, 3.0, 30.0, 5.0], [20.0, 2.0, 20.0, 10.0])
        .with_oob(Channel::Green, oob_green)
        .with_oob(Channel::Red, oob_red);

    let result = detect_probes(&[s1, s2], &manifest, DetectionMethod::Empirical)?;
    assert_eq!(result.get_column_names_str(), &["IlmnID", "s1", "s2"]);
    assert_eq!(result.height(), 4);
    assert_eq!(float_column(&result, "s1")?, float_column(&result, "s2")?);
    Ok(())
}

#[test]
fn method_selector_is_explicit() {
    assert_eq!(
        "minfi".parse::<DetectionMethod>().unwrap(),
        DetectionMethod::Parametric
    );
    assert_eq!(
        "sesame".parse::<DetectionMethod>().unwrap(),
        DetectionMethod::Empirical
    );
    assert_eq!(DetectionMethod::default(), DetectionMethod::Empirical);
    // Unknown names fail instead of silently falling back to the default.
    assert!("poobah2".parse::<DetectionMethod>().is_err());
}

#[rstest]
fn null_intensity_is_a_validation_error(
    oob_green: DataFrame,
    oob_red: DataFrame,
    manifest: Manifest,
) {
    let data = df!(
        "IlmnID" => ["cg01", "cg02", "cg03", "cg04"],
        "meth" => [Some(3.0), None, Some(30.0), Some(5.0)],
        "unmeth" => [20.0, 2.0, 20.0, 10.0],
    )
    .unwrap();
    let sample = SampleContainer::try_new("s1", "IlmnID", data)
        .unwrap()
        .with_oob(Channel::Green, oob_green)
        .with_oob(Channel::Red, oob_red);

    let err = pval_empirical(&[sample], &manifest).unwrap_err();
    assert!(matches!(err, IllumethError::Validation(_)));
}

#[rstest]
fn empirical_needs_oob_tables(
    oob_green: DataFrame,
    manifest: Manifest,
) {
    let sample = container("s1", [1.0; 4], [1.0; 4]).with_oob(Channel::Green, oob_green);
    let err = pval_empirical(&[sample], &manifest).unwrap_err();
    assert!(matches!(err, IllumethError::Validation(_)));
}

#[test]
fn pvalues_stay_in_unit_interval_on_synthetic_data() {
    let mut rng = StdRng::seed_from_u64(42);
    let intensity = LogNormal::new(5.0, 1.0).unwrap();

    let n = 30;
    let ids = (0..n).map(|i| format!("cg{:03}", i)).collect::<Vec<_>>();
    let designs = (0..n)
        .map(|i| if i % 3 == 0 { "II" } else { "I" })
        .collect::<Vec<_>>();
    let colors = (0..n)
        .map(|i| {
            match i % 3 {
                0 => None,
                1 => Some("Grn"),
                _ => Some("Red"),
            }
        })
        .collect::<Vec<_>>();
    let addr_a = (0..n as u32).map(|i| 1000 + i).collect::<Vec<_>>();
    let addr_b = (0..n as u32).map(|i| Some(2000 + i)).collect::<Vec<_>>();
    let manifest = Manifest::try_new(
        df!(
            "IlmnID" => &ids,
            "Infinium_Design_Type" => designs,
            "Color_Channel" => colors,
            "AddressA_ID" => addr_a,
            "AddressB_ID" => addr_b,
        )
        .unwrap(),
        "IlmnID",
    )
    .unwrap();

    let meth = (0..n).map(|_| intensity.sample(&mut rng)).collect::<Vec<_>>();
    let unmeth = (0..n).map(|_| intensity.sample(&mut rng)).collect::<Vec<_>>();
    let data = df!(
        "IlmnID" => &ids,
        "meth" => meth,
        "unmeth" => unmeth,
    )
    .unwrap();

    let oob = |rng: &mut StdRng| {
        let values = (0..100)
            .map(|_| rng.gen_range(0.0..500.0))
            .collect::<Vec<f64>>();
        df!("mean_value" => values).unwrap()
    };
    let negatives = |rng: &mut StdRng| {
        let values = (0..10)
            .map(|_| rng.gen_range(50.0..150.0))
            .collect::<Vec<f64>>();
        df!(
            "Extended_Type" => (0..10).map(|i| format!("neg{}", i)).collect::<Vec<_>>(),
            "Control_Type" => vec!["NEGATIVE"; 10],
            "mean_value" => values,
        )
        .unwrap()
    };

    let sample = SampleContainer::try_new("s1", "IlmnID", data)
        .unwrap()
        .with_oob(Channel::Green, oob(&mut rng))
        .with_oob(Channel::Red, oob(&mut rng))
        .with_controls(Channel::Green, negatives(&mut rng))
        .with_controls(Channel::Red, negatives(&mut rng));

    for method in [DetectionMethod::Empirical, DetectionMethod::Parametric] {
        let result = detect_probes(&[sample.clone()], &manifest, method).unwrap();
        assert_eq!(result.height(), n);
        for p in float_column(&result, "s1").unwrap() {
            assert!((0.0..=1.0).contains(&p), "p-value {} out of range", p);
        }
    }
}

#[rstest]
fn single_sample_poobah(
    oob_green: DataFrame,
    oob_red: DataFrame,
    manifest: Manifest,
) -> anyhow::Result<()> {
    let readings = RawIntensities::try_new(
        df!(
            "illumina_id" => [1001u32, 1002, 1004, 2002],
            "mean_value" => [3.0, 2.0, 5.0, 3.0],
        )?,
        df!(
            "illumina_id" => [1001u32, 1003, 1004, 2003],
            "mean_value" => [20.0, 20.0, 10.0, 30.0],
        )?,
    )?;
    let meth = MethylationDataset::methylated(&readings, &manifest)?;
    let unmeth = MethylationDataset::unmethylated(&readings, &manifest)?;

    let result = pval_empirical_single(
        &meth,
        &unmeth,
        &manifest,
        &oob_green,
        &oob_red,
        "mean_value",
    )?;

    assert_eq!(
        result.get_column_names_str(),
        &["IlmnID", DETECTION_PVALUE_COL]
    );
    assert_eq!(
        string_column(&result, "IlmnID")?,
        vec!["cg01", "cg02", "cg03", "cg04"]
    );
    let pvalues = float_column(&result, DETECTION_PVALUE_COL)?;
    assert_approx_eq!(pvalues[0], 0.4);
    assert_approx_eq!(pvalues[1], 0.4);
    assert_approx_eq!(pvalues[2], 0.4);
    assert_approx_eq!(pvalues[3], 0.0);
    Ok(())
}

#[rstest]
fn single_sample_rejects_key_mismatch(
    oob_green: DataFrame,
    oob_red: DataFrame,
    manifest: Manifest,
) -> anyhow::Result<()> {
    // Datasets built against a manifest keyed "illumina_id" must not be
    // silently aligned with a manifest keyed "IlmnID".
    let renamed = manifest_with_key("illumina_id");
    let readings = RawIntensities::try_new(
        df!(
            "illumina_id" => [1001u32, 1002, 1004, 2002],
            "mean_value" => [3.0, 2.0, 5.0, 3.0],
        )?,
        df!(
            "illumina_id" => [1001u32, 1003, 1004, 2003],
            "mean_value" => [20.0, 20.0, 10.0, 30.0],
        )?,
    )?;
    let meth = MethylationDataset::methylated(&readings, &renamed)?;
    let unmeth = MethylationDataset::unmethylated(&readings, &renamed)?;

    let err = pval_empirical_single(
        &meth,
        &unmeth,
        &manifest,
        &oob_green,
        &oob_red,
        "mean_value",
    )
    .unwrap_err();
    assert!(matches!(err, IllumethError::SchemaMismatch(_)));
    Ok(())
}
