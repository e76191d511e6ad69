use isa_operand::*;

use super::init_log;

const ARM: &str = r#"
namespace = "ArmISA"

[types]
vu = "uint32_t"
sf = "float32_t"

[operands.Rc]
kind = "int_reg"
ext = "uq"
spec = "RC"
flags = "(IsInteger, [], IsCondWrite)"
sort_pri = 2

[operands.Fa]
kind = "float_reg"
ext = "df"
spec = "FA"
read_predicate = "Rc.sq"

[operands.Vs]
kind = "vec_reg"
spec = ["VS", { e0 = { index = "0", ext = "ud" }, e1 = { index = "1", ext = "vu" } }]

[operands.Cpsr]
kind = "control_reg"
ext = "uw"
spec = "MISCREG_CPSR"
flags = "IsSerializeAfter"

[operands.Cpsr.overrides]
read = "readCpsr(xc, {idx})"

[operands.NPC]
kind = "pc_state"
ext = "uq"
spec = "npc"
"#;

#[test]
fn build_table() {
    init_log();
    let (ctx, table) = IsaConfig::from_toml_str(ARM).unwrap().build().unwrap();
    assert_eq!(ctx.namespace, "ArmISA");
    assert_eq!(ctx.ctype("vu").unwrap(), "uint32_t");
    assert_eq!(ctx.ctype("sf").unwrap(), "float32_t");
    assert_eq!(ctx.ctype("ud").unwrap(), "uint64_t");
    assert_eq!(table.len(), 5);

    let rc = &table["Rc"];
    assert_eq!(rc.kind(), StorageKind::IntReg);
    assert_eq!(rc.dflt_ext(), Some("uq"));
    assert_eq!(rc.sort_pri(), Some(2));
    assert_eq!(rc.flags().uncond, vec!["IsInteger"]);
    assert_eq!(rc.flags().dest, vec!["IsCondWrite"]);

    assert_eq!(table["Fa"].read_predicate(), Some("Rc.sq"));

    let vs = &table["Vs"];
    assert_eq!(vs.reg_spec(), "VS");
    assert_eq!(vs.elem("e1").unwrap(), &ElemDef::new("1", "vu"));

    let cpsr = &table["Cpsr"];
    assert_eq!(cpsr.flags().uncond, vec!["IsSerializeAfter"]);
    assert_eq!(
        cpsr.overrides().read.as_deref(),
        Some("readCpsr(xc, {idx})")
    );
    assert!(table["NPC"].kind().is_pc_state());
}

#[test]
fn compile_from_table() {
    init_log();
    let (ctx, table) = IsaConfig::from_toml_str(ARM).unwrap().build().unwrap();

    let rc = Operand::new(&ctx, &table["Rc"], "Rc", None, false, true)
        .unwrap()
        .finalize(&RegIndexAlloc::fixed(None, Some(0)))
        .unwrap();
    assert_eq!(rc.flags, vec!["IsInteger", "IsCondWrite"]);
    assert_eq!(rc.decl, "uint64_t Rc = 0;\n");

    let cpsr = Operand::new(&ctx, &table["Cpsr"], "Cpsr", None, true, false)
        .unwrap()
        .finalize(&RegIndexAlloc::fixed(Some(4), None))
        .unwrap();
    assert_eq!(cpsr.src_read, "Cpsr = readCpsr(xc, 4);\n");

    let mut vs = Operand::new(&ctx, &table["Vs"], "Vs", None, true, false)
        .unwrap();
    vs.set_active_elems(vec![ActiveElem::new("e1", None)]);
    let vs = vs.finalize(&RegIndexAlloc::fixed(Some(1), None)).unwrap();
    assert!(vs.decl.contains("\n\tuint32_t e1 = 0;"));
    assert!(vs.src_read.ends_with("\t\te1 = Vs[1];\n"));
}

#[test]
fn without_default_types() {
    let text = r#"
namespace = "RiscvISA"
default_types = false

[types]
ud = "uint64_t"

[operands.Rd]
kind = "int_reg"
spec = "RD"
"#;
    let (ctx, table) = IsaConfig::from_toml_str(text).unwrap().build().unwrap();
    assert_eq!(ctx.operand_types().len(), 1);
    assert!(matches!(
        ctx.ctype("sf"),
        Err(OperandError::UnknownExtension(_))
    ));
    assert_eq!(table["Rd"].dflt_ext(), None);
    assert!(table["Rd"].flags().is_empty());
}

#[test]
fn malformed_flags_rejected() {
    let text = r#"
namespace = "ArmISA"

[operands.Rc]
kind = "int_reg"
spec = "RC"
flags = "(IsInteger, [])"
"#;
    let err = IsaConfig::from_toml_str(text).unwrap_err();
    assert!(matches!(err, OperandError::Config(_)));
    assert!(err.to_string().contains("malformed flag spec"), "{err}");
}

#[test]
fn bad_elements_rejected_at_build() {
    let text = r#"
namespace = "ArmISA"

[operands.Rd]
kind = "int_reg"
spec = ["RD", { e0 = { index = "0", ext = "ud" } }]
"#;
    let config = IsaConfig::from_toml_str(text).unwrap();
    assert!(matches!(
        config.build(),
        Err(OperandError::InvalidElementSpec { .. })
    ));
}

#[test]
fn unknown_fields_rejected() {
    let text = r#"
namespace = "ArmISA"

[operands.Rd]
kind = "int_reg"
spec = "RD"
predicate = "true"
"#;
    assert!(matches!(
        IsaConfig::from_toml_str(text),
        Err(OperandError::Config(_))
    ));

    let text = r#"
namespace = "ArmISA"

[operands.Rd]
kind = "fancy_reg"
spec = "RD"
"#;
    assert!(matches!(
        IsaConfig::from_toml_str(text),
        Err(OperandError::Config(_))
    ));
}

#[test]
fn missing_file() {
    let err = IsaConfig::load("/nonexistent/operands.toml").unwrap_err();
    match err {
        OperandError::Io { path, source } => {
            assert_eq!(path, "/nonexistent/operands.toml");
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other}"),
    }
}
