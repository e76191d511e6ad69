use isa_operand::*;

use super::{compile, ctx, desc};

// ── Memory ───────────────────────────────────────────────────

#[test]
fn mem_declares_only() {
    let ctx = ctx();
    let d = desc(OperandDesc::builder("Mem", StorageKind::Mem, "").ext("uq"));
    let op = compile(&ctx, &d, None, true, true, RegIndexAlloc::default());
    assert_eq!(op.decl, "uint64_t Mem = {};\n");
    assert_eq!(op.src_decl, op.decl);
    assert_eq!(op.dest_decl, op.decl);
    assert!(op.constructor.is_empty());
    assert!(op.src_read.is_empty());
    assert!(op.dest_write.is_empty());
    assert!(op.operand().is_mem());
    assert!(!op.operand().is_reg());
}

#[test]
fn mem_ignores_predication() {
    let ctx = ctx();
    let d = desc(OperandDesc::builder("Mem", StorageKind::Mem, "").ext("uw"));
    let op = compile(
        &ctx,
        &d,
        Some("sb"),
        false,
        true,
        RegIndexAlloc::predicated(true, true),
    );
    assert_eq!(op.decl, "int8_t Mem = {};\n");
    assert!(op.constructor.is_empty());
    assert!(op.dest_write.is_empty());
}

#[test]
fn mem_without_type() {
    let ctx = ctx();
    let d = desc(OperandDesc::builder("Mem", StorageKind::Mem, ""));
    let op = Operand::new(&ctx, &d, "Mem", None, true, false).unwrap();
    let err = op.finalize(&RegIndexAlloc::default()).unwrap_err();
    assert!(matches!(err, OperandError::UnresolvedOperandType(n) if n == "Mem"));
}

// ── PC state ─────────────────────────────────────────────────

#[test]
fn pc_component() {
    let ctx = ctx();
    let d = desc(
        OperandDesc::builder("NPC", StorageKind::PcState, "npc").ext("uq"),
    );
    let op = compile(&ctx, &d, None, true, true, RegIndexAlloc::default());
    assert!(op.operand().is_pc_part());
    assert_eq!(op.decl, "uint64_t NPC = 0;\n");
    assert_eq!(op.src_read, "NPC = __parserAutoPCState.npc();\n");
    assert_eq!(op.dest_write, "__parserAutoPCState.npc(NPC);\n");
    assert!(op.constructor.is_empty());
}

#[test]
fn whole_pc_state() {
    let ctx = ctx();
    let d = desc(OperandDesc::builder("PCS", StorageKind::PcState, ""));
    let op = compile(&ctx, &d, None, true, true, RegIndexAlloc::default());
    assert!(op.operand().is_pc_state());
    assert!(!op.operand().is_pc_part());
    assert_eq!(op.decl, "ArmISA::PCState PCS = 0;\n");
    assert_eq!(op.src_read, "PCS = xc->pcState().as<ArmISA::PCState>();\n");
    assert_eq!(op.dest_write, "xc->pcState(PCS);\n");
}

#[test]
fn pc_component_source_only() {
    let ctx = ctx();
    let d = desc(
        OperandDesc::builder("PC", StorageKind::PcState, "instPC").ext("uw"),
    );
    let op = compile(&ctx, &d, None, true, false, RegIndexAlloc::default());
    assert_eq!(op.decl, "uint32_t PC = 0;\n");
    assert_eq!(op.src_read, "PC = __parserAutoPCState.instPC();\n");
    assert!(op.dest_write.is_empty());
    assert!(op.dest_decl.is_empty());
}

#[test]
fn pc_component_without_type() {
    let ctx = ctx();
    let d = desc(OperandDesc::builder("NPC", StorageKind::PcState, "npc"));
    let op = Operand::new(&ctx, &d, "NPC", None, false, true).unwrap();
    let err = op.finalize(&RegIndexAlloc::default()).unwrap_err();
    assert!(matches!(err, OperandError::UnresolvedOperandType(_)));
}
